use actix_web::web;

pub mod auth;
pub mod methods;
pub mod publication;

pub async fn index() -> impl actix_web::Responder {
    actix_web::HttpResponse::Ok().finish()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/methods/{method}", web::post().to(methods::call))
        .service(
            web::scope("/notes")
                .route("", web::get().to(publication::list))
                .route("/subscribe", web::get().to(publication::subscribe)),
        );
}
