mod chat;

use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{error, info};

use rs_markov_core::{Engine, EngineConfig};
use chat::{ChatRouter, Reply};

/// Command-line settings, each with an environment fallback.
#[derive(Parser, Debug)]
#[command(name = "rs-markov-server", about = "Markov chain chat engine over HTTP")]
struct Args {
	/// Snapshot file (`.bin` for postcard, anything else JSON)
	#[arg(long, env = "MARKOV_SNAPSHOT", default_value = "Dict1.json")]
	snapshot: PathBuf,

	/// Training events between two automatic saves
	#[arg(long, env = "MARKOV_FLUSH_THRESHOLD", default_value_t = 20)]
	flush_threshold: usize,

	/// Generation attempts before falling back
	#[arg(long, env = "MARKOV_MAX_ATTEMPTS", default_value_t = 10)]
	max_attempts: usize,

	/// Word that asks for a sentence
	#[arg(long, env = "MARKOV_TRIGGER", default_value = "mark")]
	trigger: String,

	/// Message that forces a save
	#[arg(long, env = "MARKOV_SAVE_COMMAND", default_value = "msave")]
	save_command: String,

	#[arg(long, env = "MARKOV_HOST", default_value = "127.0.0.1")]
	host: String,

	#[arg(long, env = "MARKOV_PORT", default_value_t = 5000)]
	port: u16,
}

impl Args {
	fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			flush_threshold: self.flush_threshold,
			max_attempts: self.max_attempts,
			..EngineConfig::with_snapshot(self.snapshot.clone())
		}
	}
}

struct SharedData {
	engine: Engine,
	router: ChatRouter,
}

/// HTTP POST endpoint `/v1/messages`
///
/// Feeds one chat message to the engine. Replies with a generated sentence
/// when the trigger word is present, otherwise with no content.
#[post("/v1/messages")]
async fn post_message(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Engine lock failed"),
	};
	let SharedData { engine, router } = &mut *shared_data;

	match router.handle(engine, &body) {
		Reply::Say(sentence) => HttpResponse::Ok().body(sentence),
		Reply::Saved(true) => HttpResponse::Ok().body("Saved"),
		Reply::Saved(false) => HttpResponse::InternalServerError().body("Save failed"),
		Reply::Silent => HttpResponse::NoContent().finish(),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns a generated sentence as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Engine lock failed"),
	};
	HttpResponse::Ok().body(shared_data.engine.generate())
}

#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Engine lock failed"),
	};
	if shared_data.engine.train(&body) {
		HttpResponse::Ok().body("Trained")
	} else {
		HttpResponse::BadRequest().body("Nothing to train")
	}
}

#[put("/v1/save")]
async fn put_save(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Engine lock failed"),
	};
	if shared_data.engine.flush_now() {
		HttpResponse::Ok().body("Saved")
	} else {
		HttpResponse::InternalServerError().body("Save failed")
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Engine lock failed"),
	};
	HttpResponse::Ok().json(shared_data.engine.stats())
}

/// Main entry point for the server.
///
/// Loads the snapshot (a corrupt one aborts startup), wraps the engine in a
/// `Mutex`, serves the endpoints, and saves once more on shutdown.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let engine = Engine::open(args.engine_config()).map_err(|e| {
		error!("cannot load training data: {e}");
		std::io::Error::other(e)
	})?;

	let shared_data = SharedData {
		engine,
		router: ChatRouter::new(&args.trigger, &args.save_command),
	};
	let shared_engine = web::Data::new(Mutex::new(shared_data));
	let server_engine = shared_engine.clone();

	info!("Markov server online on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.app_data(server_engine.clone())
			.service(post_message)
			.service(get_generated)
			.service(put_train)
			.service(put_save)
			.service(get_stats)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await?;

	if let Ok(mut shared_data) = shared_engine.lock() {
		if shared_data.engine.pending_writes() > 0 && !shared_data.engine.flush_now() {
			error!("training data not saved on shutdown");
		}
	}
	Ok(())
}
