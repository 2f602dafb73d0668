// In-memory doubles for the unit of work and the file manager. Transactions
// snapshot the whole store on begin and restore it on rollback, which gives
// the tests real atomicity without a database.

use crate::files::FileManager;
use async_trait::async_trait;
use person_registry_domain::city::{City, CityFilter, CityRepository};
use person_registry_domain::lookup::{
    PersonRelationType, PersonRelationTypeRepository, PhoneNumberType, PhoneNumberTypeRepository,
};
use person_registry_domain::paging::{PagedResult, PageRequest};
use person_registry_domain::person::{
    Person, PersonDetails, PersonFilter, PersonPhoneNumber, PersonRepository, PhoneNumberDetails,
    RelationDetails,
};
use person_registry_domain::relation::{
    PersonRelation, PersonRelationRepository, RelationReportRow,
};
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct DbState {
    cities: Vec<City>,
    persons: Vec<Person>,
    phones: Vec<PersonPhoneNumber>,
    relations: Vec<PersonRelation>,
    relation_types: Vec<PersonRelationType>,
    phone_number_types: Vec<PhoneNumberType>,
}

#[derive(Debug, Default)]
struct Store {
    state: DbState,
    snapshot: Option<DbState>,
    opened: u32,
    committed: u32,
    rolled_back: u32,
}

type SharedStore = Arc<Mutex<Store>>;

fn next_id<'a>(ids: impl Iterator<Item = &'a i32>) -> i32 {
    ids.copied().max().unwrap_or(0) + 1
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn page_of<T: Clone>(rows: Vec<T>, page: PageRequest) -> PagedResult<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.size.max(0) as usize)
        .collect();
    PagedResult::new(items, total, page)
}

struct InMemoryCityRepository {
    store: SharedStore,
}

#[async_trait]
impl CityRepository for InMemoryCityRepository {
    async fn add(&self, city: &mut City) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        city.id = next_id(store.state.cities.iter().map(|c| &c.id));
        store.state.cities.push(city.clone());
        Ok(())
    }

    async fn update(&self, city: &City) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let row = store
            .state
            .cities
            .iter_mut()
            .find(|c| c.id == city.id)
            .ok_or(DomainError::not_found("city", city.id))?;
        *row = city.clone();
        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.state.cities.retain(|c| c.id != id);
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<City>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .cities
            .iter()
            .find(|c| c.id == id && !c.is_deleted)
            .cloned())
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        let store = self.store.lock().unwrap();
        let name = name.trim().to_lowercase();
        Ok(store
            .state
            .cities
            .iter()
            .any(|c| !c.is_deleted && c.name.to_lowercase() == name))
    }

    async fn list(&self, filter: &CityFilter, page: PageRequest) -> Result<PagedResult<City>> {
        let store = self.store.lock().unwrap();
        let mut rows: Vec<City> = store
            .state
            .cities
            .iter()
            .filter(|c| !c.is_deleted)
            .filter(|c| filter.query.as_deref().is_none_or(|q| contains_ci(&c.name, q)))
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.id);
        Ok(page_of(rows, page))
    }
}

struct InMemoryPersonRepository {
    store: SharedStore,
}

impl InMemoryPersonRepository {
    fn load(state: &DbState, id: i32) -> Option<Person> {
        let mut person = state
            .persons
            .iter()
            .find(|p| p.id == id && !p.is_deleted)
            .cloned()?;
        person.phone_numbers = state
            .phones
            .iter()
            .filter(|ph| ph.person_id == id && !ph.is_deleted)
            .cloned()
            .collect();
        Some(person)
    }

    fn matches(filter: &PersonFilter, person: &Person) -> bool {
        let free_text = filter.query.as_deref().is_none_or(|q| {
            contains_ci(&person.name, q)
                || contains_ci(&person.last_name, q)
                || contains_ci(&person.personal_number, q)
        });
        free_text
            && filter.name.as_deref().is_none_or(|v| contains_ci(&person.name, v))
            && filter
                .last_name
                .as_deref()
                .is_none_or(|v| contains_ci(&person.last_name, v))
            && filter
                .personal_number
                .as_deref()
                .is_none_or(|v| contains_ci(&person.personal_number, v))
            && filter.gender.is_none_or(|g| person.gender == g)
            && filter.birth_date.is_none_or(|d| person.birth_date == d)
            && filter.city_id.is_none_or(|id| person.city_id == id)
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn add(&self, person: &mut Person) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        person.id = next_id(store.state.persons.iter().map(|p| &p.id));
        store.state.persons.push(person.clone());
        Ok(())
    }

    async fn update(&self, person: &Person) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let row = store
            .state
            .persons
            .iter_mut()
            .find(|p| p.id == person.id)
            .ok_or(DomainError::not_found("person", person.id))?;
        let mut updated = person.clone();
        updated.phone_numbers = Vec::new();
        *row = updated;
        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.state.persons.retain(|p| p.id != id);
        store.state.phones.retain(|ph| ph.person_id != id);
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Person>> {
        let store = self.store.lock().unwrap();
        Ok(Self::load(&store.state, id))
    }

    async fn get_details_by_id(&self, id: i32) -> Result<Option<PersonDetails>> {
        let store = self.store.lock().unwrap();
        let state = &store.state;
        let Some(person) = Self::load(state, id) else {
            return Ok(None);
        };

        let city_name = state
            .cities
            .iter()
            .find(|c| c.id == person.city_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let phone_numbers = person
            .phone_numbers
            .iter()
            .map(|ph| PhoneNumberDetails {
                id: ph.id,
                phone_number: ph.phone_number.clone(),
                phone_number_type_id: ph.phone_number_type_id,
                phone_number_type: state
                    .phone_number_types
                    .iter()
                    .find(|t| t.id == ph.phone_number_type_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default(),
            })
            .collect();

        let relations = state
            .relations
            .iter()
            .filter(|r| r.person_id == id && !r.is_deleted)
            .filter_map(|r| {
                let related = state.persons.iter().find(|p| p.id == r.related_person_id)?;
                Some(RelationDetails {
                    related_person_id: related.id,
                    related_person_name: related.name.clone(),
                    related_person_last_name: related.last_name.clone(),
                    relation_type_id: r.relation_type_id,
                    relation_type: state
                        .relation_types
                        .iter()
                        .find(|t| t.id == r.relation_type_id)
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                })
            })
            .collect();

        Ok(Some(PersonDetails {
            person,
            city_name,
            phone_numbers,
            relations,
        }))
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .persons
            .iter()
            .any(|p| p.id == id && !p.is_deleted))
    }

    async fn personal_number_exists(&self, personal_number: &str) -> Result<bool> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .persons
            .iter()
            .any(|p| !p.is_deleted && p.personal_number == personal_number.trim()))
    }

    async fn list(&self, filter: &PersonFilter, page: PageRequest) -> Result<PagedResult<Person>> {
        let store = self.store.lock().unwrap();
        let mut rows: Vec<Person> = store
            .state
            .persons
            .iter()
            .filter(|p| !p.is_deleted && Self::matches(filter, p))
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.id);
        Ok(page_of(rows, page))
    }

    async fn add_phone(&self, person_id: i32, phone: &mut PersonPhoneNumber) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        phone.id = next_id(store.state.phones.iter().map(|p| &p.id));
        phone.person_id = person_id;
        store.state.phones.push(phone.clone());
        Ok(())
    }

    async fn update_phone(&self, phone: &PersonPhoneNumber) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let row = store
            .state
            .phones
            .iter_mut()
            .find(|p| p.id == phone.id)
            .ok_or(DomainError::not_found("phone number", phone.id))?;
        *row = phone.clone();
        Ok(())
    }
}

struct InMemoryRelationRepository {
    store: SharedStore,
}

#[async_trait]
impl PersonRelationRepository for InMemoryRelationRepository {
    async fn add(&self, relation: &mut PersonRelation) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        relation.id = next_id(store.state.relations.iter().map(|r| &r.id));
        store.state.relations.push(relation.clone());
        Ok(())
    }

    async fn update(&self, relation: &PersonRelation) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let row = store
            .state
            .relations
            .iter_mut()
            .find(|r| r.id == relation.id)
            .ok_or(DomainError::not_found("person relation", relation.id))?;
        *row = relation.clone();
        Ok(())
    }

    async fn get_by_triple(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<Option<PersonRelation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .relations
            .iter()
            .find(|r| {
                !r.is_deleted
                    && r.person_id == person_id
                    && r.related_person_id == related_person_id
                    && r.relation_type_id == relation_type_id
            })
            .cloned())
    }

    async fn triple_exists(
        &self,
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    ) -> Result<bool> {
        Ok(self
            .get_by_triple(person_id, related_person_id, relation_type_id)
            .await?
            .is_some())
    }

    async fn relation_report(&self) -> Result<Vec<RelationReportRow>> {
        let store = self.store.lock().unwrap();
        let state = &store.state;
        let mut counts: HashMap<(i32, i32), i64> = HashMap::new();
        for r in state.relations.iter().filter(|r| !r.is_deleted) {
            *counts.entry((r.person_id, r.relation_type_id)).or_default() += 1;
        }

        let mut keys: Vec<_> = counts.keys().copied().collect();
        keys.sort_unstable();
        let rows = keys
            .into_iter()
            .filter_map(|(person_id, type_id)| {
                let person = state.persons.iter().find(|p| p.id == person_id)?;
                let relation_type = state.relation_types.iter().find(|t| t.id == type_id)?;
                Some(RelationReportRow {
                    person_name: person.name.clone(),
                    person_last_name: person.last_name.clone(),
                    personal_number: person.personal_number.clone(),
                    relation_type: relation_type.name.clone(),
                    relation_count: counts[&(person_id, type_id)],
                })
            })
            .collect();
        Ok(rows)
    }
}

struct InMemoryRelationTypeRepository {
    store: SharedStore,
}

#[async_trait]
impl PersonRelationTypeRepository for InMemoryRelationTypeRepository {
    async fn add(&self, relation_type: &mut PersonRelationType) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        relation_type.id = next_id(store.state.relation_types.iter().map(|t| &t.id));
        store.state.relation_types.push(relation_type.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<PersonRelationType>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .relation_types
            .iter()
            .find(|t| t.id == id && !t.is_deleted)
            .cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

struct InMemoryPhoneNumberTypeRepository {
    store: SharedStore,
}

#[async_trait]
impl PhoneNumberTypeRepository for InMemoryPhoneNumberTypeRepository {
    async fn add(&self, number_type: &mut PhoneNumberType) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        number_type.id = next_id(store.state.phone_number_types.iter().map(|t| &t.id));
        store.state.phone_number_types.push(number_type.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<PhoneNumberType>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .state
            .phone_number_types
            .iter()
            .find(|t| t.id == id && !t.is_deleted)
            .cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool> {
        Ok(self.get_by_id(id).await?.is_some())
    }
}

/// In-memory unit of work seeded with the same lookup rows the live schema
/// seeds: phone number types Mobile/Home/Work (1..3) and relation types
/// Colleague/Acquaintance/Relative/Other (1..4).
pub struct InMemoryUnitOfWork {
    store: SharedStore,
    cities: InMemoryCityRepository,
    persons: InMemoryPersonRepository,
    relations: InMemoryRelationRepository,
    relation_types: InMemoryRelationTypeRepository,
    phone_number_types: InMemoryPhoneNumberTypeRepository,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        let store: SharedStore = Arc::default();
        {
            let mut locked = store.lock().unwrap();
            for (id, name) in [(1, "Mobile"), (2, "Home"), (3, "Work")] {
                let mut t = PhoneNumberType::create(name);
                t.id = id;
                locked.state.phone_number_types.push(t);
            }
            for (id, name) in [
                (1, "Colleague"),
                (2, "Acquaintance"),
                (3, "Relative"),
                (4, "Other"),
            ] {
                let mut t = PersonRelationType::create(name);
                t.id = id;
                locked.state.relation_types.push(t);
            }
        }
        Self::with_store(store)
    }

    fn with_store(store: SharedStore) -> Self {
        Self {
            cities: InMemoryCityRepository { store: store.clone() },
            persons: InMemoryPersonRepository { store: store.clone() },
            relations: InMemoryRelationRepository { store: store.clone() },
            relation_types: InMemoryRelationTypeRepository { store: store.clone() },
            phone_number_types: InMemoryPhoneNumberTypeRepository { store: store.clone() },
            store,
        }
    }

    pub fn transactions_opened(&self) -> u32 {
        self.store.lock().unwrap().opened
    }

    pub fn committed(&self) -> u32 {
        self.store.lock().unwrap().committed
    }

    pub fn rolled_back(&self) -> u32 {
        self.store.lock().unwrap().rolled_back
    }
}

impl Default for InMemoryUnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones share the backing store, so a cloned instance behaves like a new
/// unit of work over the same database.
impl Clone for InMemoryUnitOfWork {
    fn clone(&self) -> Self {
        Self::with_store(self.store.clone())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn cities(&self) -> &dyn CityRepository {
        &self.cities
    }

    fn persons(&self) -> &dyn PersonRepository {
        &self.persons
    }

    fn person_relations(&self) -> &dyn PersonRelationRepository {
        &self.relations
    }

    fn person_relation_types(&self) -> &dyn PersonRelationTypeRepository {
        &self.relation_types
    }

    fn phone_number_types(&self) -> &dyn PhoneNumberTypeRepository {
        &self.phone_number_types
    }

    async fn begin_transaction(&self) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        if store.snapshot.is_none() {
            store.snapshot = Some(store.state.clone());
            store.opened += 1;
        }
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        if store.snapshot.take().is_some() {
            store.committed += 1;
        }
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(snapshot) = store.snapshot.take() {
            store.state = snapshot;
            store.rolled_back += 1;
        }
        Ok(())
    }
}

/// File manager double that keeps bytes in a map and records every delete.
pub struct RecordingFileManager {
    files: Mutex<HashMap<String, Vec<u8>>>,
    deleted: Mutex<Vec<String>>,
    counter: Mutex<u32>,
}

impl RecordingFileManager {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            deleted: Mutex::new(Vec::new()),
            counter: Mutex::new(0),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for RecordingFileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileManager for RecordingFileManager {
    async fn upload(&self, file_name: &str, content: &[u8]) -> Result<String> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let path = format!("photos/{counter:04}-{file_name}");
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), content.to_vec());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files.lock().unwrap().remove(path);
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn replace(
        &self,
        file_name: &str,
        content: &[u8],
        existing_path: &str,
    ) -> Result<String> {
        self.delete(existing_path).await?;
        self.upload(file_name, content).await
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(DomainError::infrastructure(format!("no file at {path}")))
    }
}
