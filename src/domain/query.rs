//! Resolved listing plan for movies.
//!
//! A [`MovieQuery`] is what both storage backends consume: filters already
//! validated, the sort key already mapped onto a known column, and the
//! page window already computed. Nothing in here can be unbounded.

use crate::domain::entities::Movie;
use crate::domain::filters::{Filters, SortDirection, validate_filters};
use crate::domain::validator::Validator;
use crate::error::AppError;

/// Sortable movie columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieColumn {
    Id,
    Title,
    Year,
    Runtime,
}

impl MovieColumn {
    fn from_sort_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(MovieColumn::Id),
            "title" => Some(MovieColumn::Title),
            "year" => Some(MovieColumn::Year),
            "runtime" => Some(MovieColumn::Runtime),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            MovieColumn::Id => "id",
            MovieColumn::Title => "title",
            MovieColumn::Year => "year",
            MovieColumn::Runtime => "runtime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    /// Case-insensitive substring; empty matches everything.
    pub title: String,
    /// Required genres; a row must carry all of them. Empty matches everything.
    pub genres: Vec<String>,
    pub sort_column: MovieColumn,
    pub sort_direction: SortDirection,
    pub page: i64,
    pub page_size: i64,
    pub limit: i64,
    pub offset: i64,
}

impl MovieQuery {
    /// Validates `filters` and resolves them into a plan.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] naming every offending filter field.
    pub fn build(title: &str, genres: &[String], filters: &Filters) -> Result<Self, AppError> {
        let mut v = Validator::new();
        validate_filters(&mut v, filters);
        v.into_result()?;

        let key = filters.sort_column()?;
        let sort_column = MovieColumn::from_sort_key(key).ok_or_else(|| {
            let mut v = Validator::new();
            v.add_error("sort", "invalid sort value");
            AppError::Validation(v.errors().clone())
        })?;

        Ok(Self {
            title: title.trim().to_string(),
            genres: genres.to_vec(),
            sort_column,
            sort_direction: filters.sort_direction(),
            page: filters.page,
            page_size: filters.page_size,
            limit: filters.limit(),
            offset: filters.offset(),
        })
    }

    /// In-process equivalent of the SQL `WHERE` clause.
    pub fn matches(&self, movie: &Movie) -> bool {
        let title_ok = self.title.is_empty()
            || movie
                .title
                .to_lowercase()
                .contains(&self.title.to_lowercase());
        let genres_ok = self.genres.iter().all(|g| movie.genres.contains(g));

        title_ok && genres_ok
    }

    /// In-process equivalent of the SQL `ORDER BY`: the chosen column in
    /// the chosen direction, ties broken by ascending id.
    pub fn compare(&self, a: &Movie, b: &Movie) -> std::cmp::Ordering {
        let primary = match self.sort_column {
            MovieColumn::Id => a.id.cmp(&b.id),
            MovieColumn::Title => a.title.cmp(&b.title),
            MovieColumn::Year => a.year.cmp(&b.year),
            MovieColumn::Runtime => a.runtime.cmp(&b.runtime),
        };
        let primary = match self.sort_direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };

        primary.then_with(|| a.id.cmp(&b.id))
    }
}
