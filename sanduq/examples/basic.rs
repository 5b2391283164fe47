//! Basic example of the Sanduq container.
//!
//! Run with `RUST_LOG=sanduq_container=debug` to see resolution logs.

use sanduq::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Injectable)]
struct Database {
    #[inject(default = String::from("postgres://localhost/myapp"))]
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
    #[inject(default)]
    verbose: bool,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        if self.verbose {
            self.logger.log(&format!("Getting user {id}"));
        }
        self.repo.find_user(id)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = Container::builder()
        .register::<Database>()
        .register::<UserRepository>()
        .register::<UserService>()
        .factory(
            Identifier::of::<Arc<dyn Logger>>(),
            Callable::from_fn("console logger", || {
                Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>)
            }),
        )
        .alias("users", Identifier::of::<UserService>())
        .build()?;

    println!("Container built: {container:?}");

    // cached resolution through an alias
    let service = container
        .resolve("users", args! { "verbose" => true }, false)?
        .downcast::<UserService>()
        .map_err(|_| SanduqError::TypeMismatch {
            identifier: Identifier::new("users"),
            expected: "UserService",
        })?;
    println!("{}", service.get_user(42));

    // a fresh service still shares the cached repository
    let quiet: Arc<UserService> = container.make_new(Args::default())?;
    println!("{}", quiet.get_user(7));
    println!("Repository shared: {}", Arc::ptr_eq(&service.repo, &quiet.repo));

    // a pre-built dependency is used as-is
    let test_db = Arc::new(Database {
        url: "sqlite::memory:".to_string(),
        logger: Arc::new(ConsoleLogger),
    });
    let repo: Arc<UserRepository> = container.make_new(Args::positional().push_arc(test_db))?;
    println!("{}", repo.find_user(1));

    Ok(())
}
