use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use growl::{
    order::{OrderBackend, OrderConfig, OrderDispatcher, OrderError, OrderRequest},
    pipeline::{Coordinator, PipelineConfig},
    recommender::{
        GenerationRequest, GeneratorError, GeneratorPort, RecommendationClient, RecommenderConfig,
        error,
    },
};

pub const GOOD_REPLY: &str =
    r#"{"restaurant":"Shetty Lunch Home","dish":"Neer Dosa","rationale":"Light and low fat"}"#;

pub enum Reply {
    Text(&'static str),
    Fail,
}

pub struct ScriptedGenerator {
    reply: Reply,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(reply: Reply) -> Arc<Self> {
        Self::with_delay(reply, Duration::ZERO)
    }

    pub fn with_delay(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

#[async_trait]
impl GeneratorPort for ScriptedGenerator {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, req: GenerationRequest) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(req.prompt.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail => Err(error::transient("generator unavailable")),
        }
    }
}

#[derive(Default)]
pub struct CountingOrderBackend {
    pub orders: Mutex<Vec<OrderRequest>>,
}

#[async_trait]
impl OrderBackend for CountingOrderBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn place(&self, req: &OrderRequest) -> Result<bool, OrderError> {
        self.orders.lock().expect("order log lock").push(req.clone());
        Ok(true)
    }
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        window_secs: 120,
        min_count: 3,
        big_meal_count: 5,
        cooldown_secs: 3600,
        profile: None,
    }
}

pub fn coordinator(config: PipelineConfig, generator: Arc<ScriptedGenerator>) -> Coordinator {
    let recommender = RecommendationClient::new(generator, &RecommenderConfig::default());
    Coordinator::new(config, recommender, OrderDispatcher::simulated())
}

pub fn coordinator_with_backend(
    generator: Arc<ScriptedGenerator>,
    backend: Arc<CountingOrderBackend>,
) -> Coordinator {
    let recommender = RecommendationClient::new(generator, &RecommenderConfig::default());
    let mut order_config = OrderConfig::default();
    order_config.contact.phone = Some("9876543210".to_string());
    let dispatcher = OrderDispatcher::new(Some(backend), &order_config);
    Coordinator::new(pipeline_config(), recommender, dispatcher)
}
