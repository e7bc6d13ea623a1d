//! SeaORM entity models
//!
//! Database entities for MovieReview

mod comment;
mod movie;
mod sentiment;

pub use movie::{
    Entity as MovieEntity,
    Model as MovieRow,
    ActiveModel as MovieActiveModel,
    Column as MovieColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as CommentRow,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use sentiment::Sentiment;
