//! Full-page layout composed from component fragments.

use minijinja::context;

use crate::model::{Badge, Contributor, Feature, InstallationStep, NavItem};
use crate::templates::{ComponentRenderer, Navigation, RenderError};

/// Content of the landing page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Site title, used for `<title>` and the header logo
    pub title: String,
    /// Short hero tagline
    pub tagline: String,
    /// Meta description
    pub description: String,
    pub nav: Vec<NavItem>,
    pub badges: Vec<Badge>,
    pub features: Vec<Feature>,
    pub steps: Vec<InstallationStep>,
    pub contributors: Vec<Contributor>,
    /// Stylesheet URLs linked from `<head>`
    pub styles: Vec<String>,
    /// Script URLs loaded at the end of `<body>`
    pub scripts: Vec<String>,
}

impl PageLayout {
    /// Render the complete page.
    pub fn render(&self, renderer: &ComponentRenderer) -> Result<String, RenderError> {
        let desktop_nav = renderer.render(&Navigation::desktop(&self.nav))?;
        let mobile_nav = renderer.render(&Navigation::mobile(&self.nav))?;
        let badges = renderer.render_all(&self.badges)?;
        let features = renderer.render_all(&self.features)?;
        let steps = renderer.render_all(&self.steps)?;
        let contributors = renderer.render_all(&self.contributors)?;

        tracing::debug!(
            features = self.features.len(),
            steps = self.steps.len(),
            contributors = self.contributors.len(),
            "Rendering page layout"
        );

        renderer.render_template(
            "page.html",
            context! {
                title => &self.title,
                tagline => &self.tagline,
                description => &self.description,
                desktop_nav => desktop_nav,
                mobile_nav => mobile_nav,
                badges => badges,
                features => features,
                steps => steps,
                contributors => contributors,
                styles => &self.styles,
                scripts => &self.scripts,
            },
        )
    }
}

pub(crate) const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if description %}<meta name="description" content="{{ description }}">{% endif %}
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body class="bg-gray-50 text-gray-900">
  <nav class="sticky top-0 z-50 bg-white shadow-sm">
    <div class="container mx-auto px-4 py-4 flex items-center justify-between">
      <a href="#" class="text-xl md:text-2xl font-bold claude-primary">{{ title }}</a>
      <div class="hidden md:flex space-x-6">
        {{ desktop_nav | safe }}
      </div>
      <button onclick="toggleMobileMenu()" class="md:hidden text-2xl" aria-label="Toggle menu">
        <i class="fas fa-bars"></i>
      </button>
    </div>
    <div id="mobileMenu" class="hidden md:hidden flex flex-col space-y-2 px-4 pb-4">
      {{ mobile_nav | safe }}
    </div>
  </nav>

  <section class="hero py-16 md:py-24 text-center">
    <h1 class="text-4xl md:text-6xl font-bold claude-primary mb-4">{{ title }}</h1>
    {% if tagline %}<p class="text-lg md:text-xl text-gray-600 mb-8">{{ tagline }}</p>{% endif %}
    <div class="flex flex-wrap justify-center gap-2 mb-8">
      {{ badges | safe }}
    </div>
    <p class="text-sm text-gray-600">Contributors: <span id="contributor-count">...</span></p>
  </section>

  {% if features %}
  <section id="features" class="py-16">
    <div class="container mx-auto px-4 grid md:grid-cols-2 lg:grid-cols-3 gap-6">
      {{ features | safe }}
    </div>
  </section>
  {% endif %}

  {% if steps %}
  <section id="installation" class="py-16">
    <div class="container mx-auto px-4 space-y-6">
      {{ steps | safe }}
    </div>
  </section>
  {% endif %}

  {% if contributors %}
  <section id="contributors" class="py-16">
    <div class="container mx-auto px-4 grid grid-cols-2 md:grid-cols-4 gap-6">
      {{ contributors | safe }}
    </div>
  </section>
  {% endif %}

  {% for script in scripts %}<script src="{{ script }}"></script>
  {% endfor %}
</body>
</html>"##;
