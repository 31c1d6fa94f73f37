use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, post, web};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use headline_gen_core::model::bigram_model::BigramModel;
use headline_gen_core::model::config::{GenerationConfig, ModelConfig};

/// Upper bound on headlines returned by a single `/v1/generate` call.
const MAX_COUNT: usize = 100;

/// Upper bound on novelty retries per generated headline.
const MAX_NB_TRY: usize = 100;

/// Server settings, from flags or environment variables.
#[derive(Parser, Debug)]
#[command(name = "headline-gen-server", about = "Serve a bigram headline model over HTTP")]
struct Settings {
	/// Training corpus, one headline per line
	#[arg(long, env = "HEADLINE_CORPUS", default_value = "./data/headlines.txt")]
	corpus: String,

	/// Additive smoothing constant (> 0)
	#[arg(long, env = "HEADLINE_ALPHA", default_value_t = 1.0)]
	alpha: f64,

	/// Words seen at most this many times collapse into <unk>
	#[arg(long, env = "HEADLINE_MIN_FREQ", default_value_t = 1)]
	min_freq: usize,

	#[arg(long, env = "HEADLINE_HOST", default_value = "127.0.0.1")]
	host: String,

	#[arg(long, env = "HEADLINE_PORT", default_value_t = 5000)]
	port: u16,
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
	nb_try: Option<usize>,
	max_tokens: Option<usize>,
	seed: Option<u64>,
}

impl GenerateParams {
	/// Validates the query and turns it into a generation config.
	fn generation_config(&self) -> Result<GenerationConfig, String> {
		let mut config = GenerationConfig::default();
		config.nb_try = match self.nb_try.unwrap_or(5) {
			n if n > MAX_NB_TRY => return Err(format!("nb_try must be at most {MAX_NB_TRY}")),
			n => n,
		};
		config.set_max_tokens(self.max_tokens).map_err(|e| e.to_string())?;
		Ok(config)
	}

	fn count(&self) -> Result<usize, String> {
		match self.count.unwrap_or(1) {
			0 => Err("count must be at least 1".to_owned()),
			n if n > MAX_COUNT => Err(format!("count must be at most {MAX_COUNT}")),
			n => Ok(n),
		}
	}
}

#[derive(Serialize)]
struct Stats {
	vocabulary_size: usize,
	contexts: usize,
	distinct_bigrams: usize,
	headlines: usize,
	alpha: f64,
	min_freq: usize,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` headlines, one per line. A `seed` makes the response
/// reproducible; without it the thread-local generator is used.
#[get("/v1/generate")]
async fn get_generated(model: web::Data<BigramModel>, query: web::Query<GenerateParams>) -> impl Responder {
	let (config, count) = match (query.generation_config(), query.count()) {
		(Ok(config), Ok(count)) => (config, count),
		(Err(e), _) | (_, Err(e)) => return HttpResponse::BadRequest().body(e),
	};

	let mut rng = match query.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_rng(&mut rand::rng()),
	};

	let mut headlines = Vec::with_capacity(count);
	for _ in 0..count {
		match model.generate(&mut rng, &config) {
			Ok(headline) => headlines.push(headline.to_string()),
			Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
		}
	}

	HttpResponse::Ok().body(headlines.join("\n"))
}

/// HTTP POST endpoint `/v1/perplexity`
///
/// The body holds held-out headlines, one per line. Returns the mean
/// perplexity with two decimals.
#[post("/v1/perplexity")]
async fn post_perplexity(model: web::Data<BigramModel>, body: String) -> impl Responder {
	let lines: Vec<&str> = body.lines().collect();
	match model.perplexity(&lines) {
		Ok(perplexity) => HttpResponse::Ok().body(format!("{perplexity:.2}")),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

#[get("/v1/stats")]
async fn get_stats(model: web::Data<BigramModel>) -> impl Responder {
	let config = model.config();
	web::Json(Stats {
		vocabulary_size: model.vocabulary().len(),
		contexts: model.counts().contexts(),
		distinct_bigrams: model.counts().distinct_bigrams(),
		headlines: model.headline_count(),
		alpha: config.alpha(),
		min_freq: config.min_freq(),
	})
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated).service(post_perplexity).service(get_stats);
}

/// Main entry point for the server.
///
/// Trains (or loads the cached) model once, shares it read-only between
/// workers, and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let settings = Settings::parse();
	let config = ModelConfig::new(settings.alpha, settings.min_freq)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let model = BigramModel::from_file(&settings.corpus, config).map_err(std::io::Error::other)?;
	let shared_model = web::Data::new(model);

	log::info!("listening on {}:{}", settings.host, settings.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(routes)
	})
		.bind((settings.host.as_str(), settings.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn model() -> web::Data<BigramModel> {
		let lines = ["stocks rally as markets rebound", "markets fall on rate fears", "rate cut lifts stocks"];
		web::Data::new(BigramModel::train(&lines, ModelConfig::new(0.5, 0).unwrap()).unwrap())
	}

	#[actix_web::test]
	async fn seeded_generation_is_reproducible() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		let mut bodies = Vec::new();
		for _ in 0..2 {
			let req = test::TestRequest::get().uri("/v1/generate?count=3&seed=17").to_request();
			let body = test::call_and_read_body(&app, req).await;
			bodies.push(body);
		}
		assert_eq!(bodies[0], bodies[1]);
		assert_eq!(std::str::from_utf8(&bodies[0]).unwrap().lines().count(), 3);
	}

	#[actix_web::test]
	async fn invalid_parameters_are_rejected() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		for uri in [
			"/v1/generate?count=0",
			"/v1/generate?max_tokens=0",
			"/v1/generate?count=1000",
			"/v1/generate?nb_try=101",
			"/v1/generate?nb_try=18446744073709551615",
		] {
			let req = test::TestRequest::get().uri(uri).to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
		}
	}

	#[actix_web::test]
	async fn retries_up_to_the_cap_are_accepted() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		let uri = format!("/v1/generate?nb_try={MAX_NB_TRY}&seed=3");
		let req = test::TestRequest::get().uri(&uri).to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn perplexity_has_two_decimals() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/v1/perplexity")
			.set_payload("markets rally\nrate fears")
			.to_request();
		let body = test::call_and_read_body(&app, req).await;
		let text = std::str::from_utf8(&body).unwrap();
		let (_, decimals) = text.split_once('.').unwrap();
		assert_eq!(decimals.len(), 2);
		assert!(text.parse::<f64>().unwrap() >= 1.0);
	}

	#[actix_web::test]
	async fn empty_held_out_set_is_a_bad_request() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		let req = test::TestRequest::post().uri("/v1/perplexity").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn stats_report_the_model() {
		let app = test::init_service(App::new().app_data(model()).configure(routes)).await;

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats["min_freq"], 0);
		assert_eq!(stats["alpha"], 0.5);
		assert_eq!(stats["headlines"], 3);
	}
}
