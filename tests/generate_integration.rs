use md2pdf::contract::{MockRenderer, RenderJob};
use md2pdf::front_matter::split;
use md2pdf::generate::{Generator, GeneratorOptions, Manifest};
use md2pdf::metadata::MetaValue;
use md2pdf::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Working root with a `styles/report.yml` profile and a config file.
struct Workspace {
    root: TempDir,
    generated: TempDir,
}

impl Workspace {
    fn new(config_yaml: &str) -> Self {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("styles")).unwrap();
        fs::write(root.path().join("styles/report.yml"), "font_size: 11\n").unwrap();
        fs::write(root.path().join("md2pdf.yml"), config_yaml).unwrap();
        Self {
            root,
            generated: tempdir().unwrap(),
        }
    }

    fn source(&self, relative: &str, content: &str) -> &Self {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            root_dir: self.root.path().to_path_buf(),
            config_file: "md2pdf.yml".into(),
            styling_dir: "styles".into(),
            generation_root: self.generated.path().to_path_buf(),
        }
    }
}

/// Renderer mock that records every job and reports success.
fn recording_renderer() -> (MockRenderer, Arc<Mutex<Vec<RenderJob>>>) {
    let jobs = Arc::new(Mutex::new(Vec::new()));
    let sink = jobs.clone();
    let mut renderer = MockRenderer::new();
    renderer.expect_render().returning(move |job| {
        sink.lock().unwrap().push(job.clone());
        Ok(())
    });
    (renderer, jobs)
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}

#[test]
fn test_default_metadata_is_injected_into_header() {
    let ws = Workspace::new(
        r#"
default:
  author: Jane
documents:
  - styling: report
    source: doc.md
    destination: out/doc.pdf
"#,
    );
    ws.source("doc.md", "# Report\n\nHello\n");
    let (renderer, jobs) = recording_renderer();

    let manifest = Generator::new(ws.options(), &renderer)
        .run()
        .expect("generation should succeed");

    assert_eq!(manifest, Manifest::from(vec!["out/doc.pdf".to_string()]));
    let jobs = jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.content, "---\nauthor: Jane\n---\n\n# Report\n\nHello\n");
    assert_eq!(job.style_path, ws.root.path().join("styles/report.yml"));
    assert_eq!(job.asset_base, ws.root.path());
    assert_eq!(job.destination, ws.generated.path().join("out/doc.pdf"));
    assert!(
        ws.generated.path().join("out").is_dir(),
        "intermediate destination directories are created"
    );
}

#[test]
fn test_entry_metadata_overrides_default() {
    let ws = Workspace::new(
        r#"
default:
  author: Jane
documents:
  - styling: report
    source: doc.md
    destination: out/doc.pdf
    author: Bob
"#,
    );
    ws.source("doc.md", "Hello\n");
    let (renderer, jobs) = recording_renderer();

    Generator::new(ws.options(), &renderer).run().unwrap();

    let jobs = jobs.lock().unwrap();
    let (header, _) = split(&jobs[0].content).unwrap();
    assert_eq!(header.get("author"), Some(&MetaValue::from("Bob")));
}

#[test]
fn test_control_keys_never_reach_the_header() {
    let ws = Workspace::new(
        r#"
default:
  styling: report
  company: ACME
documents:
  - source: docs/manual.md
    destination: manual.pdf
    version: 3
"#,
    );
    ws.source(
        "docs/manual.md",
        "---\ntitle: Manual\ncompany: Old Corp\n---\n\nContent\n",
    );
    let (renderer, jobs) = recording_renderer();

    Generator::new(ws.options(), &renderer).run().unwrap();

    let jobs = jobs.lock().unwrap();
    let (header, body) = split(&jobs[0].content).unwrap();
    assert_eq!(header.get("title"), Some(&MetaValue::from("Manual")));
    assert_eq!(header.get("company"), Some(&MetaValue::from("ACME")));
    assert_eq!(header.get("version"), Some(&MetaValue::Integer(3)));
    for key in ["styling", "source", "destination"] {
        assert!(!header.contains_key(key), "{key} leaked into header");
    }
    assert_eq!(body, "Content\n");
    assert_eq!(jobs[0].asset_base, ws.root.path().join("docs"));
}

#[test]
fn test_header_declared_control_keys_are_overridden_and_dropped() {
    let ws = Workspace::new(
        "documents:\n  - { styling: report, source: real.md, destination: real.pdf }\n",
    );
    ws.source(
        "real.md",
        "---\nsource: elsewhere.md\nstyling: letter\ntitle: Real\n---\n\nReal body\n",
    );
    let (renderer, jobs) = recording_renderer();

    Generator::new(ws.options(), &renderer).run().unwrap();

    let jobs = jobs.lock().unwrap();
    let (header, body) = split(&jobs[0].content).unwrap();
    assert_eq!(body, "Real body\n");
    assert_eq!(header.get("title"), Some(&MetaValue::from("Real")));
    assert!(!header.contains_key("source"));
    assert!(!header.contains_key("styling"));
    assert_eq!(jobs[0].style_path, ws.root.path().join("styles/report.yml"));
}

#[test]
fn test_manifest_follows_declaration_order_across_groups() {
    let ws = Workspace::new(
        r#"
- documents:
    - { styling: report, source: c.md, destination: z/c.pdf }
    - { styling: report, source: a.md, destination: a.pdf }
- documents:
    - { styling: report, source: b.md, destination: m/b.pdf }
"#,
    );
    for name in ["a.md", "b.md", "c.md"] {
        ws.source(name, "text\n");
    }
    let (renderer, _) = recording_renderer();

    let manifest = Generator::new(ws.options(), &renderer).run().unwrap();

    assert_eq!(manifest.entries(), ["z/c.pdf", "a.pdf", "m/b.pdf"]);
}

#[test]
fn test_missing_source_file_stops_before_next_document() {
    let ws = Workspace::new(
        r#"
documents:
  - { styling: report, source: missing.md, destination: first/one.pdf }
  - { styling: report, source: present.md, destination: second/two.pdf }
"#,
    );
    ws.source("present.md", "text\n");
    let mut renderer = MockRenderer::new();
    renderer.expect_render().never();

    let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

    assert!(
        matches!(err, Error::SourceNotFound { .. }),
        "expected SourceNotFound, got {err:?}"
    );
    assert!(is_empty_dir(ws.generated.path()));
}

#[test]
fn test_missing_control_keys_fail_without_touching_generation_root() {
    let cases = [
        (
            "documents:\n  - { source: doc.md, destination: out/doc.pdf }\n",
            "styling",
        ),
        (
            "documents:\n  - { styling: report, destination: out/doc.pdf }\n",
            "source",
        ),
        (
            "documents:\n  - { styling: report, source: doc.md }\n",
            "destination",
        ),
    ];

    for (yaml, missing) in cases {
        let ws = Workspace::new(yaml);
        ws.source("doc.md", "text\n");
        let mut renderer = MockRenderer::new();
        renderer.expect_render().never();

        let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

        let matched = match missing {
            "styling" => matches!(err, Error::MissingStyling { .. }),
            "source" => matches!(err, Error::MissingSource { .. }),
            _ => matches!(err, Error::MissingDestination { .. }),
        };
        assert!(matched, "missing {missing}: unexpected error {err:?}");
        assert!(
            is_empty_dir(ws.generated.path()),
            "missing {missing}: generation root must stay empty"
        );
    }
}

#[test]
fn test_unknown_styling_is_reported_with_its_path() {
    let ws = Workspace::new(
        "documents:\n  - { styling: letter, source: doc.md, destination: doc.pdf }\n",
    );
    ws.source("doc.md", "text\n");
    let mut renderer = MockRenderer::new();
    renderer.expect_render().never();

    let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

    match err {
        Error::StylingNotFound { path, .. } => {
            assert_eq!(path, ws.root.path().join("styles/letter.yml"))
        }
        other => panic!("expected StylingNotFound, got {other:?}"),
    }
}

#[test]
fn test_renderer_failure_aborts_the_run() {
    let ws = Workspace::new(
        r#"
documents:
  - { styling: report, source: doc.md, destination: one.pdf }
  - { styling: report, source: doc.md, destination: two.pdf }
"#,
    );
    ws.source("doc.md", "text\n");
    let mut renderer = MockRenderer::new();
    renderer
        .expect_render()
        .times(1)
        .returning(|_| Err("engine crashed".into()));

    let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

    match err {
        Error::Render { message, destination } => {
            assert_eq!(message, "engine crashed");
            assert_eq!(destination, ws.generated.path().join("one.pdf"));
        }
        other => panic!("expected Render error, got {other:?}"),
    }
}

#[test]
fn test_malformed_source_header_is_reported() {
    let ws = Workspace::new(
        "documents:\n  - { styling: report, source: doc.md, destination: doc.pdf }\n",
    );
    ws.source("doc.md", "---\n- not\n- a map\n---\nBody\n");
    let mut renderer = MockRenderer::new();
    renderer.expect_render().never();

    let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

    assert!(matches!(err, Error::MalformedHeader(_)), "got {err:?}");
}

#[test]
fn test_empty_configuration_yields_empty_manifest() {
    let ws = Workspace::new("documents: []\n");
    let mut renderer = MockRenderer::new();
    renderer.expect_render().never();

    let manifest = Generator::new(ws.options(), &renderer).run().unwrap();

    assert!(manifest.is_empty());
}

#[test]
fn test_missing_config_file_is_a_config_load_error() {
    let ws = Workspace::new("documents: []\n");
    fs::remove_file(ws.root.path().join("md2pdf.yml")).unwrap();
    let renderer = MockRenderer::new();

    let err = Generator::new(ws.options(), &renderer).run().unwrap_err();

    assert!(matches!(err, Error::ConfigLoad { .. }));
}
