// Clustering — k-means engine, elbow curve, knee detection and labeling.

pub mod elbow;
pub mod init;
pub mod kmeans;
pub mod knee;
pub mod labels;
