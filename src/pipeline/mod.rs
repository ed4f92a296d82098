// Pipeline orchestration — training runs and inference over stored models.

pub mod inspect;
pub mod train;
