pub mod cities;
pub mod lookup;
pub mod persons;
pub mod relations;

pub use cities::PgCityRepository;
pub use lookup::{PgPersonRelationTypeRepository, PgPhoneNumberTypeRepository};
pub use persons::PgPersonRepository;
pub use relations::PgPersonRelationRepository;
