use crate::api::{attendance, employee, reports, schedule};
use crate::config::Config;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(employee::get_employee)),
                    )
                    // /employees/{id}/schedule
                    .service(
                        web::resource("/{id}/schedule")
                            .route(web::put().to(schedule::upsert_schedule))
                            .route(web::get().to(schedule::get_schedule)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_record))
                            .route(web::get().to(attendance::list_records)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_record))
                            .route(web::put().to(attendance::update_record)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("/daily").route(web::get().to(reports::daily)))
                    .service(web::resource("/weekly").route(web::get().to(reports::weekly)))
                    .service(web::resource("/monthly").route(web::get().to(reports::monthly)))
                    .service(web::resource("/summary").route(web::get().to(reports::summary)))
                    .service(
                        web::resource("/compliance")
                            .route(web::get().to(reports::compliance_report)),
                    )
                    .service(
                        web::resource("/exceptions")
                            .route(web::get().to(reports::exceptions_report)),
                    )
                    .service(
                        web::resource("/payroll").route(web::get().to(reports::payroll_report)),
                    ),
            ),
    );
}
