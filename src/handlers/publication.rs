use actix::{Actor, ActorContext, AsyncContext, Handler, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use super::auth;
use crate::{
    errors::ServerError,
    feed::NotesChanged,
    service::{Caller, NoteService},
    AppState,
};

pub async fn list(
    req: HttpRequest,
    env: web::Data<AppState>,
    service: web::Data<NoteService>,
) -> Result<HttpResponse, ServerError> {
    let caller = auth::caller(&req, &env);
    let notes = service.list_mine(&caller)?;
    Ok(HttpResponse::Ok().json(notes))
}

/// Upgrades to a websocket that receives the caller's notes as a JSON array
/// on connect and again after every change to them.
pub async fn subscribe(
    req: HttpRequest,
    stream: web::Payload,
    env: web::Data<AppState>,
    service: web::Data<NoteService>,
) -> Result<HttpResponse, actix_web::Error> {
    let caller = auth::caller(&req, &env);
    let owner_id = caller.user_id()?.to_string();

    ws::start(
        NoteSubscription {
            owner_id,
            caller,
            service: service.get_ref().clone(),
        },
        &req,
        stream,
    )
}

struct NoteSubscription {
    owner_id: String,
    caller: Caller,
    service: NoteService,
}

impl NoteSubscription {
    fn push(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let notes = match self.service.list_mine(&self.caller) {
            Ok(notes) => notes,
            Err(e) => {
                log::error!("subscription for {} failed: {e}", self.owner_id);
                ctx.close(Some(ws::CloseCode::Error.into()));
                ctx.stop();
                return;
            }
        };

        match serde_json::to_string(&notes) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("{e}"),
        }
    }
}

impl Actor for NoteSubscription {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let feed = self.service.feed();
        feed.subscribe(&self.owner_id, ctx.address().recipient());
        log::debug!(
            "{} subscribed to their notes ({} live subscriptions)",
            self.owner_id,
            feed.subscriber_count()
        );
        self.push(ctx);
    }
}

impl Handler<NotesChanged> for NoteSubscription {
    type Result = ();

    fn handle(&mut self, _: NotesChanged, ctx: &mut Self::Context) {
        self.push(ctx);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NoteSubscription {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(e) => {
                log::debug!("subscription for {} dropped: {e}", self.owner_id);
                ctx.stop();
            }
        }
    }
}
