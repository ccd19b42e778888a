use crate::cache::CacheService;
use crate::models::Movie;

const MOVIES_KEY: &str = "movies";
const MOVIES_GENERATION_KEY: &str = "movies:generation";

impl CacheService {
    pub async fn get_movies(&self) -> Option<Vec<Movie>> {
        self.get_json(MOVIES_KEY).await
    }

    /// Read this before loading the list from the store and hand it back to
    /// [`CacheService::cache_movies`].
    pub async fn movies_generation(&self) -> Option<i64> {
        self.generation(MOVIES_GENERATION_KEY).await
    }

    /// Caches the list unless the catalog was invalidated after `generation`
    /// was read.
    pub async fn cache_movies(&self, movies: &[Movie], generation: i64) -> bool {
        self.set_json_at_generation(MOVIES_KEY, MOVIES_GENERATION_KEY, &movies, generation)
            .await
    }

    pub async fn invalidate_movies(&self) {
        self.bump_generation(MOVIES_GENERATION_KEY).await;
        self.delete(MOVIES_KEY).await
    }
}
