// tweetclust: unsupervised topic-cluster discovery for tweet corpora
//
// This is the library root. Each module corresponds to one stage of the
// vectorize → cluster → label pipeline, plus the store that keeps fitted
// models between runs.

pub mod cluster;
pub mod config;
pub mod corpus;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod vectorize;
