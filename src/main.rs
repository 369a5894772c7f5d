mod options;

use crate::options::{SweeperCommands, SweeperOptions};
use actix_web::Scope;
use actix_web::{web, App, HttpServer};
use std::env;
use std::sync::Arc;
use structopt::StructOpt;
use tokio::sync::Mutex;
use trc20_sweeper_lib::db::create_sqlite_connection;
use trc20_sweeper_lib::db::ops::{get_transfer_rule_count, get_tx_record_count, get_tx_records_by_rule};
use trc20_sweeper_lib::misc::generate_private_key;
use trc20_sweeper_lib::server::{runtime_web_scope, AdminAuth, ServerData};
use trc20_sweeper_lib::{
    config, err_custom_create, err_from,
    error::{ErrorBag, SweeperError},
    runtime::start_sweeper_engine,
};

async fn main_internal() -> Result<(), SweeperError> {
    dotenv::dotenv().ok();
    env::set_var(
        "RUST_LOG",
        env::var("RUST_LOG").unwrap_or("info,sqlx::query=warn".to_string()),
    );

    env_logger::init();
    let cli: SweeperOptions = SweeperOptions::from_args();

    let config = config::Config::load(&cli.config).await?;

    match cli.commands {
        SweeperCommands::Run { run_options } => {
            if run_options.http && run_options.sweep_once {
                return Err(err_custom_create!(
                    "http mode cannot be combined with sweep-once option"
                ));
            }

            let db_filename =
                env::var("DB_SQLITE_FILENAME").expect("Specify DB_SQLITE_FILENAME env variable");
            log::info!("connecting to sqlite file db: {}", db_filename);
            let conn = create_sqlite_connection(Some(&db_filename), None, true).await?;

            let sp = start_sweeper_engine(
                &db_filename,
                config,
                Some(conn.clone()),
                run_options.sweep_once,
            )
            .await?;

            if run_options.http {
                let admin_user =
                    env::var("ADMIN_USER").expect("Specify ADMIN_USER env variable");
                let admin_password =
                    env::var("ADMIN_PASSWORD").expect("Specify ADMIN_PASSWORD env variable");

                let server_data = web::Data::new(Box::new(ServerData {
                    shared_state: sp.shared_state.clone(),
                    db_connection: Arc::new(Mutex::new(conn)),
                    setup: sp.setup.clone(),
                    admin_auth: AdminAuth::new(admin_user, admin_password),
                }));

                let debug = run_options.debug;
                let server = HttpServer::new(move || {
                    let cors = actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600);

                    let scope =
                        runtime_web_scope(Scope::new("sweeper"), server_data.clone(), debug);

                    App::new().wrap(cors).service(scope)
                })
                .workers(run_options.http_threads as usize)
                .bind((run_options.http_addr.as_str(), run_options.http_port))
                .expect("Cannot run server")
                .run();

                log::info!(
                    "http server starting on {}:{}",
                    run_options.http_addr,
                    run_options.http_port
                );

                server.await.unwrap();
            } else {
                sp.runtime_handle.await.unwrap();
            }
        }
        SweeperCommands::GenerateKey => {
            let (secret_key, address) = generate_private_key();
            println!("Private key: {}", hex::encode(secret_key.secret_bytes()));
            println!("Address: {address}");
        }
        SweeperCommands::Stats { stats_options } => {
            let db_filename =
                env::var("DB_SQLITE_FILENAME").expect("Specify DB_SQLITE_FILENAME env variable");
            log::info!("connecting to sqlite file db: {}", db_filename);
            let conn = create_sqlite_connection(Some(&db_filename), None, true).await?;

            if let Some(rule_id) = stats_options.rule_id {
                let records = get_tx_records_by_rule(&conn, rule_id, None)
                    .await
                    .map_err(err_from!())?;
                println!("Records for rule {}: {}", rule_id, records.len());
                for record in records {
                    println!(
                        "{} {} {} {}",
                        record.created_date,
                        record.status,
                        record.amount,
                        record.tx_hash
                    );
                }
            } else {
                println!(
                    "Transfer rules: {}",
                    get_transfer_rule_count(&conn).await.map_err(err_from!())?
                );
                println!(
                    "Transaction records: {}",
                    get_tx_record_count(&conn).await.map_err(err_from!())?
                );
            }
        }
    }

    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), SweeperError> {
    match main_internal().await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            Err(e)
        }
    }
}
