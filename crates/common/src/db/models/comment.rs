//! Comment entity with derived sentiment fields

use sea_orm::entity::prelude::*;

use super::sentiment::Sentiment;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    /// Ascending ids give insertion order within a movie
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub movie_id: i32,

    #[sea_orm(column_type = "Text")]
    pub user_name: String,

    #[sea_orm(column_type = "Text")]
    pub comment: String,

    /// 1..=5, checked before insert
    pub rate_score: i32,

    pub emotion: Sentiment,

    /// 0.0..=1.0
    pub confidence_score: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
