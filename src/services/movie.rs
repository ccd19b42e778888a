use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{Movie, MovieDraft};
use crate::store::MovieRepository;

#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieRepository>) -> Self {
        Self { movies }
    }

    pub async fn create_movie(&self, draft: MovieDraft) -> Result<Movie, CatalogError> {
        let movie = Movie::from_draft(draft);
        self.movies.insert(&movie).await?;
        info!("Movie {} '{}' created", movie.id, movie.title);
        Ok(movie)
    }

    pub async fn update_movie(&self, id: Uuid, draft: MovieDraft) -> Result<Movie, CatalogError> {
        let mut movie = self.get_movie(id).await?;
        movie.apply(draft);
        if !self.movies.update(&movie).await? {
            return Err(CatalogError::NotFound { entity: "movie", id });
        }
        Ok(movie)
    }

    /// Deletes the movie and its showtimes.
    pub async fn delete_movie(&self, id: Uuid) -> Result<(), CatalogError> {
        if !self.movies.delete(id).await? {
            return Err(CatalogError::NotFound { entity: "movie", id });
        }
        info!("Movie {} deleted", id);
        Ok(())
    }

    pub async fn get_movie(&self, id: Uuid) -> Result<Movie, CatalogError> {
        self.movies
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound { entity: "movie", id })
    }

    /// Newest first.
    pub async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        Ok(self.movies.list().await?)
    }
}
