pub mod memory_store;
pub mod mongo_store;
pub mod record_store;

pub use memory_store::InMemoryRecordStore;
pub use mongo_store::MongoRecordStore;
pub use record_store::*;

use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = database_name(uri);
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes that back the identity and tag ownership rules
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let users = self.collection::<Document>(USERS);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique())
            .build();
        users.create_index(email_index).await?;
        log::info!("   ✅ Index ready: users(email) unique");

        users.create_index(tags_index()).await?;
        log::info!("   ✅ Index ready: users(nfcTags) unique");

        let votes = self.collection::<Document>(VOTES);

        let vote_index = IndexModel::builder()
            .keys(doc! { "tagId": 1 })
            .options(unique())
            .build();
        votes.create_index(vote_index).await?;
        log::info!("   ✅ Index ready: votes(tagId) unique");

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Drops the whole database; used to tear down test fixtures.
    #[cfg(test)]
    pub async fn drop_database(&self) -> Result<(), mongodb::error::Error> {
        self.db.drop().await
    }

    /// Waits for in-flight operations and closes the connection pool.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

/// Multikey: each array member is unique across documents.
///
/// Only documents holding a string tag are indexed; an empty `nfcTags`
/// would otherwise index as `undefined` and collide with every other
/// tagless user.
fn tags_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "nfcTags": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(doc! { "nfcTags": { "$type": "string" } })
                .build(),
        )
        .build()
}

fn database_name(uri: &str) -> &str {
    uri.rsplit('/')
        .next()
        .and_then(|s| s.split('?').next())
        .filter(|s| !s.is_empty() && !s.contains(':') && !s.contains('@'))
        .unwrap_or("warsjawa")
}
