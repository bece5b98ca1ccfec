pub mod drink_repo;
pub mod error;
pub mod memory;
pub mod postgres;

pub use drink_repo::{Drink, DrinkRepo, Ingredient, NewDrink};
pub use error::RepoError;
pub use memory::MemoryDrinkRepo;
pub use postgres::PgDrinkRepo;
