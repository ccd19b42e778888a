use uuid::Uuid;

use crate::cache::CacheService;
use crate::models::Showtime;

fn showtime_key(id: Uuid) -> String {
    format!("showtime:{}", id)
}

impl CacheService {
    /// Cached showtime with its seat map.
    pub async fn get_showtime(&self, id: Uuid) -> Option<Showtime> {
        self.get_json(&showtime_key(id)).await
    }

    /// Stores a seat map unless the cache already holds a newer version of it,
    /// so a slow reader cannot put back a snapshot older than a booking.
    pub async fn cache_showtime(&self, showtime: &Showtime) -> bool {
        self.set_json_versioned(
            &showtime_key(showtime.id),
            showtime,
            showtime.version,
            self.showtime_ttl_seconds,
        )
        .await
    }

    pub async fn invalidate_showtime(&self, id: Uuid) {
        self.delete(&showtime_key(id)).await
    }
}
