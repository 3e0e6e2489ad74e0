//! In-memory storage adapters.

mod in_memory_subscription_repository;

pub use in_memory_subscription_repository::InMemorySubscriptionRepository;
