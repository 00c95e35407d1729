//! Module loader behaviour: isolation, ordering, stages, and timing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::Instant;

use bloghub_core::error::{AppError, AppResult, ErrorKind};
use bloghub_extension::hooks::{HookDispatcher, HookFn, HookRegistry};
use bloghub_extension::module::{
    Bundle, BundleSource, FnFactory, HostConfig, LoadOptions, ModuleDescriptor, ModuleFactory,
    ModuleLoader, ModuleState, Route, RouteTable, StaticBundleSource, StyleRegistry,
};

/// Bundle source whose entries can be made unreachable or malformed.
#[derive(Debug, Default)]
struct ScriptedSource {
    factories: HashMap<String, Arc<dyn ModuleFactory>>,
    unreachable: Vec<String>,
    malformed: Vec<String>,
}

impl ScriptedSource {
    fn with(mut self, entry: &str, factory: FnFactory) -> Self {
        self.factories.insert(entry.to_string(), factory.shared());
        self
    }

    fn unreachable(mut self, entry: &str) -> Self {
        self.unreachable.push(entry.to_string());
        self
    }

    fn malformed(mut self, entry: &str) -> Self {
        self.malformed.push(entry.to_string());
        self
    }
}

#[async_trait]
impl BundleSource for ScriptedSource {
    async fn fetch(&self, entry: &str) -> AppResult<Bundle> {
        if self.unreachable.iter().any(|e| e == entry) {
            return Err(AppError::new(ErrorKind::Io, format!("connection refused: {entry}")));
        }
        Ok(Bundle {
            entry: entry.to_string(),
            locator: entry.to_string(),
            bytes: Bytes::from_static(b"bundle"),
        })
    }

    async fn evaluate(&self, bundle: Bundle) -> AppResult<Arc<dyn ModuleFactory>> {
        if self.malformed.contains(&bundle.entry) {
            return Err(AppError::evaluation("unexpected token"));
        }
        self.factories
            .get(&bundle.entry)
            .cloned()
            .ok_or_else(|| AppError::evaluation("bundle has no default export"))
    }
}

struct Harness {
    hooks: HookDispatcher,
    routes: Arc<RouteTable>,
    styles: Arc<StyleRegistry>,
    loader: ModuleLoader,
}

fn harness(source: impl BundleSource + 'static) -> Harness {
    let hooks = HookDispatcher::new(Arc::new(HookRegistry::new()));
    let routes = Arc::new(RouteTable::new());
    let styles = Arc::new(StyleRegistry::new());
    let loader = ModuleLoader::new(
        Arc::new(source),
        hooks.clone(),
        routes.clone(),
        styles.clone(),
        Arc::new(HostConfig::default()),
    );
    Harness {
        hooks,
        routes,
        styles,
        loader,
    }
}

type ErrorLog = Arc<Mutex<Vec<(String, ErrorKind)>>>;

fn error_log() -> (ErrorLog, LoadOptions) {
    error_log_with(LoadOptions::sequential())
}

fn error_log_with(base: LoadOptions) -> (ErrorLog, LoadOptions) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let options = base.on_error(move |name, error| {
        sink.lock().push((name.to_string(), error.kind));
    });
    (log, options)
}

fn marker(name: &'static str) -> FnFactory {
    FnFactory::from_sync(name, move |ctx| {
        ctx.hook("seen")
            .register(HookFn::unary_sync(move |v| {
                let mut seen = v.as_array().cloned().unwrap_or_default();
                seen.push(json!(name));
                Ok(Value::Array(seen))
            }));
        Ok(())
    })
}

#[tokio::test]
async fn test_failing_module_does_not_block_the_next() {
    let source = ScriptedSource::default()
        .with(
            "mem://a",
            FnFactory::from_sync("a", |_| Err(AppError::validation("missing option"))),
        )
        .with("mem://b", marker("b"));
    let h = harness(source);
    let (errors, options) = error_log();

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("a", "mem://a"),
                ModuleDescriptor::new("b", "mem://b"),
            ],
            &options,
        )
        .await;

    assert_eq!(*errors.lock(), [("a".to_string(), ErrorKind::Factory)]);
    assert_eq!(report.succeeded(), ["b"]);
    assert_eq!(report.failures().len(), 1);

    let seen = h.hooks.filter("seen", json!([]), &[]).await.unwrap();
    assert_eq!(seen, json!(["b"]));
}

#[tokio::test]
async fn test_concurrent_mode_isolates_failures() {
    let source = ScriptedSource::default()
        .with(
            "mem://a",
            FnFactory::new("a", |_| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(AppError::validation("missing option"))
            }),
        )
        .with("mem://b", marker("b"));
    let h = harness(source);
    let (errors, options) = error_log_with(LoadOptions::concurrent());

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("a", "mem://a"),
                ModuleDescriptor::new("b", "mem://b"),
                ModuleDescriptor::new("b", "mem://b"),
            ],
            &options,
        )
        .await;

    let mut errors = errors.lock().clone();
    errors.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(
        errors,
        [
            ("a".to_string(), ErrorKind::Factory),
            ("b".to_string(), ErrorKind::Validation),
        ]
    );
    assert_eq!(report.succeeded(), ["b"]);
    assert_eq!(report.failures().len(), 2);
    assert_eq!(h.loader.state("a"), Some(ModuleState::Failed));
    assert_eq!(h.loader.state("b"), Some(ModuleState::Succeeded));

    let seen = h.hooks.filter("seen", json!([]), &[]).await.unwrap();
    assert_eq!(seen, json!(["b"]));
}

#[tokio::test]
async fn test_failed_evaluation_leaves_no_styles() {
    let source = ScriptedSource::default()
        .malformed("mem://a")
        .with("mem://b", marker("b"));
    let h = harness(source);
    let (errors, options) = error_log_with(LoadOptions::concurrent());

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("a", "mem://a").with_styles(["/a.css"]),
                ModuleDescriptor::new("b", "mem://b").with_styles(["/b.css"]),
            ],
            &options,
        )
        .await;

    assert_eq!(*errors.lock(), [("a".to_string(), ErrorKind::Evaluation)]);
    assert_eq!(report.succeeded(), ["b"]);
    assert_eq!(h.styles.urls(), ["/b.css"]);
}

#[tokio::test]
async fn test_failures_are_attributed_to_their_stage() {
    let source = ScriptedSource::default()
        .unreachable("mem://offline")
        .malformed("mem://broken")
        .with("mem://ok", marker("ok"));
    let h = harness(source);
    let (errors, options) = error_log();

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("offline", "mem://offline"),
                ModuleDescriptor::new("broken", "mem://broken"),
                ModuleDescriptor::new("ok", "mem://ok"),
            ],
            &options,
        )
        .await;

    assert_eq!(
        *errors.lock(),
        [
            ("offline".to_string(), ErrorKind::Fetch),
            ("broken".to_string(), ErrorKind::Evaluation),
        ]
    );
    assert_eq!(report.succeeded(), ["ok"]);
    assert_eq!(h.loader.state("offline"), Some(ModuleState::Failed));
    assert_eq!(h.loader.state("ok"), Some(ModuleState::Succeeded));
}

#[tokio::test]
async fn test_factory_panic_is_isolated() {
    let source = ScriptedSource::default()
        .with(
            "mem://panics",
            FnFactory::from_sync("panics", |_| panic!("theme exploded")),
        )
        .with("mem://after", marker("after"));
    let h = harness(source);
    let (errors, options) = error_log();

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("panics", "mem://panics"),
                ModuleDescriptor::new("after", "mem://after"),
            ],
            &options,
        )
        .await;

    assert_eq!(*errors.lock(), [("panics".to_string(), ErrorKind::Factory)]);
    let (_, error) = report.failures()[0];
    assert!(error.message.contains("theme exploded"));
    assert_eq!(report.succeeded(), ["after"]);
}

#[tokio::test]
async fn test_later_module_sees_earlier_registrations() {
    let source = ScriptedSource::default()
        .with(
            "mem://theme",
            FnFactory::from_sync("theme", |ctx| {
                ctx.hook("layouts")
                    .register(HookFn::unary_sync(|layouts| Ok(layouts)));
                Ok(())
            }),
        )
        .with(
            "mem://plugin",
            FnFactory::from_sync("plugin", |ctx| {
                if !ctx.hook("layouts").has() {
                    return Err(AppError::factory("theme did not declare layouts"));
                }
                Ok(())
            }),
        );
    let h = harness(source);

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("theme", "mem://theme"),
                ModuleDescriptor::new("plugin", "mem://plugin"),
            ],
            &LoadOptions::sequential(),
        )
        .await;

    assert!(report.is_clean());
}

#[tokio::test]
async fn test_styles_are_injected_before_the_factory_runs() {
    let styles_seen = Arc::new(Mutex::new(0usize));
    let seen = styles_seen.clone();
    let h_styles = Arc::new(StyleRegistry::new());
    let observed = h_styles.clone();

    let source = StaticBundleSource::new().with(
        "theme",
        FnFactory::from_sync("theme", move |ctx| {
            *seen.lock() = observed.urls().len();
            ctx.add_routes(vec![Route::new("/", "Home")], None);
            Ok(())
        })
        .shared(),
    );
    let hooks = HookDispatcher::new(Arc::new(HookRegistry::new()));
    let routes = Arc::new(RouteTable::new());
    let loader = ModuleLoader::new(
        Arc::new(source),
        hooks,
        routes.clone(),
        h_styles.clone(),
        Arc::new(HostConfig::default()),
    );

    let descriptor = ModuleDescriptor::new("theme", "builtin://theme")
        .with_styles(["/themes/default/base.css", "/themes/default/post.css"]);
    let report = loader.load(&[descriptor], &LoadOptions::sequential()).await;

    assert!(report.is_clean());
    assert_eq!(*styles_seen.lock(), 2);
    assert_eq!(
        h_styles.urls(),
        ["/themes/default/base.css", "/themes/default/post.css"]
    );
    assert_eq!(routes.entries()[0].module, "theme");
}

#[tokio::test]
async fn test_factory_receives_descriptor_args() {
    let captured = Arc::new(Mutex::new(Value::Null));
    let sink = captured.clone();
    let source = ScriptedSource::default().with(
        "mem://seo",
        FnFactory::from_sync("seo", move |ctx| {
            *sink.lock() = ctx.args().clone();
            Ok(())
        }),
    );
    let h = harness(source);

    h.loader
        .load(
            &[ModuleDescriptor::new("seo", "mem://seo").with_args(json!({"separator": " | "}))],
            &LoadOptions::sequential(),
        )
        .await;

    assert_eq!(*captured.lock(), json!({"separator": " | "}));
    assert!(h.routes.is_empty());
    assert!(h.styles.urls().is_empty());
}

#[tokio::test]
async fn test_duplicate_module_name_is_rejected() {
    let source = ScriptedSource::default().with("mem://a", marker("a"));
    let h = harness(source);
    let (errors, options) = error_log();

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("a", "mem://a"),
                ModuleDescriptor::new("a", "mem://a"),
            ],
            &options,
        )
        .await;

    assert_eq!(report.succeeded(), ["a"]);
    assert_eq!(*errors.lock(), [("a".to_string(), ErrorKind::Validation)]);
    assert_eq!(h.loader.state("a"), Some(ModuleState::Succeeded));

    let again = h
        .loader
        .load(&[ModuleDescriptor::new("a", "mem://a")], &options)
        .await;
    assert!(!again.is_clean());
    assert_eq!(h.hooks.registry().count("seen"), 1);
}

#[tokio::test]
async fn test_timeout_fails_only_the_slow_module() {
    let source = ScriptedSource::default()
        .with(
            "mem://slow",
            FnFactory::new("slow", |_| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }),
        )
        .with("mem://fast", marker("fast"));
    let h = harness(source);
    let (errors, options) = error_log();
    let options = options.timeout(Duration::from_millis(50));

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("slow", "mem://slow"),
                ModuleDescriptor::new("fast", "mem://fast"),
            ],
            &options,
        )
        .await;

    assert_eq!(*errors.lock(), [("slow".to_string(), ErrorKind::Timeout)]);
    assert_eq!(report.succeeded(), ["fast"]);
    assert_eq!(h.loader.state("slow"), Some(ModuleState::Failed));
}

type Spans = Arc<Mutex<HashMap<&'static str, (Instant, Instant)>>>;

fn timed(name: &'static str, spans: &Spans) -> FnFactory {
    let spans = spans.clone();
    FnFactory::new(name, move |_| {
        let spans = spans.clone();
        async move {
            let start = Instant::now();
            tokio::time::sleep(Duration::from_millis(50)).await;
            spans.lock().insert(name, (start, Instant::now()));
            Ok(())
        }
    })
}

async fn run_timed(options: LoadOptions) -> (Instant, Instant, Instant) {
    let spans: Spans = Arc::new(Mutex::new(HashMap::new()));
    let source = ScriptedSource::default()
        .with("mem://a", timed("a", &spans))
        .with("mem://b", timed("b", &spans));
    let h = harness(source);

    let report = h
        .loader
        .load(
            &[
                ModuleDescriptor::new("a", "mem://a"),
                ModuleDescriptor::new("b", "mem://b"),
            ],
            &options,
        )
        .await;
    assert!(report.is_clean());

    let spans = spans.lock();
    let (_, a_end) = spans["a"];
    let (b_start, _) = spans["b"];
    let (a_start, _) = spans["a"];
    (a_start, a_end, b_start)
}

#[tokio::test]
async fn test_sequential_mode_waits_for_previous_factory() {
    let (_, a_end, b_start) = run_timed(LoadOptions::sequential()).await;
    assert!(b_start >= a_end);
}

#[tokio::test]
async fn test_concurrent_mode_overlaps_factories() {
    let (a_start, a_end, b_start) = run_timed(LoadOptions::concurrent()).await;
    assert!(b_start >= a_start);
    assert!(b_start < a_end);
}
