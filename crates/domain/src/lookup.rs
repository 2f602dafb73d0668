// Named lookup entities: relation types and phone number types.

use crate::shared_kernel::Result;
use async_trait::async_trait;

/// A type of relationship between persons (e.g. Colleague, Relative).
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRelationType {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

impl PersonRelationType {
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

    pub fn delete(&mut self) {
        self.is_deleted = true;
    }
}

/// A type of phone number (e.g. Mobile, Home, Work).
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneNumberType {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

impl PhoneNumberType {
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

    pub fn delete(&mut self) {
        self.is_deleted = true;
    }
}

#[async_trait]
pub trait PersonRelationTypeRepository: Send + Sync {
    async fn add(&self, relation_type: &mut PersonRelationType) -> Result<()>;
    async fn get_by_id(&self, id: i32) -> Result<Option<PersonRelationType>>;
    async fn exists(&self, id: i32) -> Result<bool>;
}

#[async_trait]
pub trait PhoneNumberTypeRepository: Send + Sync {
    async fn add(&self, number_type: &mut PhoneNumberType) -> Result<()>;
    async fn get_by_id(&self, id: i32) -> Result<Option<PhoneNumberType>>;
    async fn exists(&self, id: i32) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_names_are_trimmed() {
        let mut rt = PersonRelationType::create("  Colleague ");
        assert_eq!(rt.name, "Colleague");
        rt.update(" Relative  ");
        assert_eq!(rt.name, "Relative");

        let nt = PhoneNumberType::create(" Mobile ");
        assert_eq!(nt.name, "Mobile");
    }
}
