use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use chitfund_backend::{
    config::Config,
    database::{create_connection, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    let pool = create_connection(&config.database)
        .await
        .expect("Failed to connect to the database");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let staff_service = StaffService::new(pool.clone());
    let member_service = MemberService::new(pool.clone());
    let group_service = GroupService::new(pool.clone());
    let ledger_service = LedgerService::new(pool.clone());
    let balance_service = BalanceService::new(pool.clone());
    let dues_service = DuesService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone());
    let auction_service = AuctionService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(staff_service.clone()))
            .app_data(web::Data::new(member_service.clone()))
            .app_data(web::Data::new(group_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(balance_service.clone()))
            .app_data(web::Data::new(dues_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(auction_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::staff_config)
                    .configure(handlers::members_config)
                    .configure(handlers::groups_config)
                    .configure(handlers::accounts_config)
                    .configure(handlers::payments_config)
                    .configure(handlers::auctions_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
