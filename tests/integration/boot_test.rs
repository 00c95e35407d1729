//! Integration tests for booting the built-in theme and plugins from config.

mod helpers;

use serde_json::json;

use bloghub_extension::hooks::names;

const SITE: &str = r##"
[site]
locale = "fr-FR"

[site.settings]
title = "Carnet"
base_url = "https://carnet.example"

[site.theme]
primary = "#b91c1c"

[extensions.theme]
module_name = "theme-default"
entry = "builtin://theme-default"
styles = ["/themes/default/base.css", "/themes/default/print.css"]

[[extensions.plugins]]
module_name = "seo"
entry = "builtin://seo"

[extensions.plugins.args]
noindex = ["/archive"]
"##;

#[tokio::test]
async fn test_theme_and_plugin_boot_from_config() {
    let app = helpers::TestApp::boot(SITE).await;

    assert!(app.report.is_clean());
    assert_eq!(app.report.succeeded(), ["theme-default", "seo"]);
    assert_eq!(app.config.site.locale, "fr-FR");
    assert_eq!(
        app.manager.styles().urls(),
        ["/themes/default/base.css", "/themes/default/print.css"]
    );
}

#[tokio::test]
async fn test_extension_points_compose() {
    let app = helpers::TestApp::boot(SITE).await;

    let title = app
        .filter(names::TITLE, json!("Bonjour"), &[json!("/posts/bonjour")])
        .await;
    assert_eq!(title, json!("Bonjour - Carnet"));

    let head = app.filter(names::HEAD, json!([]), &[json!("/archive")]).await;
    assert_eq!(
        head,
        json!([
            { "tag": "meta", "attrs": { "name": "theme-color", "content": "#b91c1c" } },
            { "tag": "link", "attrs": { "rel": "canonical", "href": "https://carnet.example/archive" } },
            { "tag": "meta", "attrs": { "name": "robots", "content": "noindex" } },
        ])
    );

    let strings = app
        .filter(names::TRANSLATIONS, json!({}), &[json!("fr-FR")])
        .await;
    assert_eq!(strings["theme.home"], "Accueil");

    let routes = app.manager.resolved_routes().await.unwrap();
    let paths: Vec<&str> = routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "/sitemap.xml",
            "/",
            "/posts/:slug",
            "/tags/:tag",
            "/categories/:category",
            "/archive"
        ]
    );
}

#[tokio::test]
async fn test_missing_builtin_is_isolated() {
    let config = format!(
        "{SITE}\n[[extensions.plugins]]\nmodule_name = \"comments\"\nentry = \"builtin://comments\"\n"
    );
    let app = helpers::TestApp::boot(&config).await;

    assert_eq!(app.report.succeeded(), ["theme-default", "seo"]);
    let failures = app.report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "comments");
}

#[tokio::test]
async fn test_plugin_without_theme_fails_alone() {
    let app = helpers::TestApp::boot(
        r#"
[[extensions.plugins]]
module_name = "seo"
entry = "builtin://seo"
"#,
    )
    .await;

    assert!(!app.report.is_clean());
    assert!(app.manager.routes().is_empty());
}
