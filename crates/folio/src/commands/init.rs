//! Scaffold a résumé project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    // Create default config
    let config_path = Path::new("site.toml");
    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG).context("Failed to write site.toml")?;
        tracing::info!("Created site.toml");
    }

    // Create the page
    let page_path = Path::new("index.html");
    if !page_path.exists() || yes {
        fs::write(page_path, DEFAULT_PAGE).context("Failed to write index.html")?;
        tracing::info!("Created index.html");
    }

    // Create script modules
    let components_dir = Path::new("components");
    if !components_dir.exists() {
        fs::create_dir_all(components_dir).context("Failed to create components directory")?;
    }

    let entry_path = components_dir.join("resume.js");
    if !entry_path.exists() || yes {
        fs::write(&entry_path, DEFAULT_ENTRY).context("Failed to write resume.js")?;
        tracing::info!("Created components/resume.js");
    }

    let contact_path = components_dir.join("contact.js");
    if !contact_path.exists() || yes {
        fs::write(&contact_path, DEFAULT_CONTACT_MODULE).context("Failed to write contact.js")?;
        tracing::info!("Created components/contact.js");
    }

    // Create stylesheet
    let styles_dir = Path::new("styles");
    if !styles_dir.exists() {
        fs::create_dir_all(styles_dir).context("Failed to create styles directory")?;
    }

    let styles_path = styles_dir.join("main.css");
    if !styles_path.exists() || yes {
        fs::write(&styles_path, DEFAULT_STYLES).context("Failed to write main.css")?;
        tracing::info!("Created styles/main.css");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio build' to produce dist/index.html.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio configuration

[site]
# Branding identifier applied to page widgets (adds a branding-<id> class);
# leave unset for the neutral variant
# branding = "screamingbox"

[paths]
# Script entry module
entry = "components/resume.js"

# Page markup to vulcanize
page = "index.html"

# Output directory for built artifacts
output = "dist"

# File name of the bundled script
bundle = "scripts.js"
"#;

const DEFAULT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Résumé</title>
  <link rel="stylesheet" href="styles/main.css">
</head>
<body>
  <header class="cover">
    <h1>Your Name</h1>
    <p class="tagline">Software Engineer</p>
    <cv-contact>
      <div class="contact-info">
        <a class="email" href="mailto:you@example.com">you@example.com</a>
        <a class="site" href="http://example.com">example.com</a>
      </div>
    </cv-contact>
  </header>
  <main>
    <section class="experience">
      <h2>Experience</h2>
      <p>Write your story here.</p>
    </section>
  </main>
  <script src="dist/scripts.js"></script>
</body>
</html>
"#;

const DEFAULT_ENTRY: &str = r#"import './contact.js';
"#;

const DEFAULT_CONTACT_MODULE: &str = r#"// Mark the contact row once scripts are running
const info = document.querySelector('.contact-info');

if (info) {
	info.classList.add('ready');
}
"#;

const DEFAULT_STYLES: &str = r#"* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  color: #222;
  line-height: 1.6;
}

.cover {
  padding: 3rem 2rem;
  background: #20232a;
  color: #fff;
}

.tagline {
  color: #9aa4b2;
}

.contact-info {
  margin-top: 1rem;
  display: flex;
  gap: 1.5rem;
}

.contact-info a {
  color: #7cc4ff;
  text-decoration: none;
}

.contact-info a:hover {
  text-decoration: underline;
}

main {
  max-width: 640px;
  padding: 2rem;
}

.experience h2 {
  margin-bottom: 0.5rem;
}
"#;
