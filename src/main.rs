use bookstall::application::order::OrderService;
use bookstall::application::settlement::SettlementService;
use bookstall::domain::catalog::StoreDoc;
use bookstall::domain::ports::{CatalogStoreRef, OrderStoreRef, UserStoreRef};
use bookstall::domain::user::User;
use bookstall::error::OrderError;
use bookstall::infrastructure::in_memory::{
    InMemoryCatalogStore, InMemoryOrderStore, InMemoryUserStore,
};
use bookstall::interfaces::csv::op_reader::{Op, OpReader};
use bookstall::interfaces::response::Response;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(UserStoreRef, CatalogStoreRef, OrderStoreRef)> {
    if let Some(path) = db_path {
        let store = bookstall::infrastructure::rocksdb::RocksDbStore::open(path).into_diagnostic()?;
        Ok((
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        ))
    } else {
        Ok(in_memory_stores())
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(UserStoreRef, CatalogStoreRef, OrderStoreRef)> {
    if db_path.is_some() {
        return Err(miette::miette!(
            "--db-path requires the storage-rocksdb feature"
        ));
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (UserStoreRef, CatalogStoreRef, OrderStoreRef) {
    (
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryOrderStore::new()),
    )
}

/// Runs one operation against the services, resolving order labels to the
/// ids generated by earlier `order` rows.
async fn run_op(
    orders: &OrderService,
    settlement: &SettlementService,
    users: &UserStoreRef,
    catalog: &CatalogStoreRef,
    labels: &mut HashMap<String, String>,
    op: Op,
) -> Response {
    match op {
        Op::SeedUser {
            user_id,
            password,
            balance,
        } => match users.put(User::new(user_id, password, balance)).await {
            Ok(()) => Response::ok(),
            Err(e) => Response::failure(&OrderError::from(e)),
        },
        Op::SeedStock {
            owner,
            store_id,
            listings,
        } => {
            let result = async {
                let mut doc = catalog
                    .get_store(&store_id)
                    .await?
                    .unwrap_or_else(|| StoreDoc::new(&store_id, &owner));
                for listing in listings {
                    doc.put_book(listing);
                }
                catalog.put_store(doc).await
            }
            .await;
            match result {
                Ok(()) => Response::ok(),
                Err(e) => Response::failure(&OrderError::from(e)),
            }
        }
        Op::Fund {
            user_id,
            password,
            amount,
        } => settlement.add_funds(&user_id, &password, amount).await.into(),
        Op::PlaceOrder {
            user_id,
            store_id,
            items,
            label,
        } => match orders.place_order(&user_id, &store_id, &items).await {
            Ok(order_id) => {
                if let Some(label) = label {
                    labels.insert(label, order_id.clone());
                }
                Response::ok_with_order(order_id)
            }
            Err(e) => Response::failure(&e),
        },
        Op::Pay {
            user_id,
            password,
            order,
        } => {
            // An unresolved label is paid as a literal id and fails with the
            // invalid-order status, which is what the caller should see.
            let order_id = labels.get(&order).cloned().unwrap_or(order);
            settlement.pay(&user_id, &password, &order_id).await.into()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (users, catalog, orders) = open_stores(cli.db_path)?;
    let order_service = OrderService::new(users.clone(), catalog.clone(), orders.clone());
    let settlement_service = SettlementService::new(users.clone(), catalog.clone(), orders);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OpReader::new(file);

    let mut labels = HashMap::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for op_result in reader.ops() {
        match op_result {
            Ok(op) => {
                let response = run_op(
                    &order_service,
                    &settlement_service,
                    &users,
                    &catalog,
                    &mut labels,
                    op,
                )
                .await;
                writeln!(out, "{response}").into_diagnostic()?;
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    Ok(())
}
