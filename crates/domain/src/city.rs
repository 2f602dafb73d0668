// City aggregate and its repository contract.

use crate::paging::{PagedResult, PageRequest};
use crate::shared_kernel::Result;
use async_trait::async_trait;

/// A city a person can reside in. Names are trimmed on every write path and
/// unique (case-insensitively) among active rows.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

impl City {
    /// Creates a new city with a normalized name. The id is assigned by the
    /// store on insert.
    pub fn create(name: &str) -> Self {
        Self {
            id: 0,
            name: name.trim().to_string(),
            is_deleted: false,
        }
    }

    pub fn update(&mut self, name: &str) {
        self.name = name.trim().to_string();
    }

    /// Marks the city as deleted. Rows are never physically removed by
    /// command handlers.
    pub fn delete(&mut self) {
        self.is_deleted = true;
    }
}

/// Optional filters applied conjunctively when listing cities. Absent fields
/// exclude nothing.
#[derive(Debug, Clone, Default)]
pub struct CityFilter {
    /// Case-insensitive substring match on the city name.
    pub query: Option<String>,
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Inserts the city and writes the store-assigned id back into it.
    async fn add(&self, city: &mut City) -> Result<()>;

    async fn update(&self, city: &City) -> Result<()>;

    /// Physical delete, for infrastructure and test use only.
    async fn remove(&self, id: i32) -> Result<()>;

    /// Primary-key lookup; soft-deleted rows are absent.
    async fn get_by_id(&self, id: i32) -> Result<Option<City>>;

    /// Whether an active city with this name exists, compared
    /// case-insensitively on the trimmed name.
    async fn name_exists(&self, name: &str) -> Result<bool>;

    async fn list(&self, filter: &CityFilter, page: PageRequest) -> Result<PagedResult<City>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_the_name() {
        let city = City::create(" Tbilisi ");
        assert_eq!(city.name, "Tbilisi");
        assert!(!city.is_deleted);
    }

    #[test]
    fn update_trims_again() {
        let mut city = City::create(" Batumi ");
        city.update(" New Batumi ");
        assert_eq!(city.name, "New Batumi");
    }

    #[test]
    fn delete_marks_without_erasing() {
        let mut city = City::create("Kutaisi");
        city.delete();
        assert!(city.is_deleted);
        assert_eq!(city.name, "Kutaisi");
    }
}
