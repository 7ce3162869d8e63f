//! Component templates and the renderer that drives them.

use minijinja::{context, Environment, Value};

use crate::layout::PAGE_TEMPLATE;
use crate::model::{Badge, CodeSnippet, Contributor, Feature, InstallationStep, NavItem};
use crate::payload;

/// A view model that renders to an HTML fragment.
pub trait Component {
    /// Name of the template registered with the renderer.
    fn template(&self) -> &'static str;

    /// Values exposed to the template.
    fn context(&self) -> Value;
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render {template}: {source}")]
    Template {
        template: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders components through minijinja with HTML auto-escaping.
pub struct ComponentRenderer {
    env: Environment<'static>,
}

impl ComponentRenderer {
    /// Create a renderer with all component templates registered.
    pub fn new() -> Self {
        let mut env = Environment::new();

        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .unwrap_or_else(|e| panic!("Failed to add {} template: {}", name, e));
        }

        Self { env }
    }

    /// Render a single component to a fragment.
    pub fn render<C: Component + ?Sized>(&self, component: &C) -> Result<String, RenderError> {
        let template = component.template();
        self.render_template(template, component.context())
    }

    /// Render a sequence of components and concatenate the fragments.
    pub fn render_all<C: Component>(&self, components: &[C]) -> Result<String, RenderError> {
        components
            .iter()
            .map(|c| self.render(c))
            .collect::<Result<Vec<_>, _>>()
            .map(|fragments| fragments.concat())
    }

    pub(crate) fn render_template(
        &self,
        template: &'static str,
        ctx: Value,
    ) -> Result<String, RenderError> {
        let map_err = |source| RenderError::Template { template, source };
        let tmpl = self.env.get_template(template).map_err(map_err)?;
        tmpl.render(ctx).map_err(map_err)
    }
}

impl Default for ComponentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Badge {
    fn template(&self) -> &'static str {
        "badge.html"
    }

    fn context(&self) -> Value {
        Value::from_serialize(self)
    }
}

impl Component for Feature {
    fn template(&self) -> &'static str {
        "feature_card.html"
    }

    fn context(&self) -> Value {
        Value::from_serialize(self)
    }
}

impl Component for Contributor {
    fn template(&self) -> &'static str {
        "contributor_card.html"
    }

    fn context(&self) -> Value {
        // Avatar and profile URLs are built in the template so that only the
        // username goes through escaping.
        context! {
            username => &self.username,
            display_name => &self.display_name,
            role => &self.role,
            tags => &self.tags,
            is_placeholder => self.is_placeholder,
        }
    }
}

impl Component for CodeSnippet {
    fn template(&self) -> &'static str {
        "code_block.html"
    }

    fn context(&self) -> Value {
        context! {
            code => &self.code,
            language => &self.language,
            payload => payload::escape(&self.code),
        }
    }
}

impl Component for InstallationStep {
    fn template(&self) -> &'static str {
        "installation_step.html"
    }

    fn context(&self) -> Value {
        Value::from_serialize(self)
    }
}

/// Which navigation bar a set of links is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPlacement {
    Desktop,
    /// Links inside `#mobileMenu`; each one also toggles the menu
    Mobile,
}

/// Navigation links for one placement.
#[derive(Debug, Clone)]
pub struct Navigation<'a> {
    pub items: &'a [NavItem],
    pub placement: NavPlacement,
}

impl<'a> Navigation<'a> {
    pub fn desktop(items: &'a [NavItem]) -> Self {
        Self {
            items,
            placement: NavPlacement::Desktop,
        }
    }

    pub fn mobile(items: &'a [NavItem]) -> Self {
        Self {
            items,
            placement: NavPlacement::Mobile,
        }
    }
}

impl Component for Navigation<'_> {
    fn template(&self) -> &'static str {
        match self.placement {
            NavPlacement::Desktop => "nav_desktop.html",
            NavPlacement::Mobile => "nav_mobile.html",
        }
    }

    fn context(&self) -> Value {
        context! { items => self.items }
    }
}

const TEMPLATES: [(&str, &str); 8] = [
    ("badge.html", BADGE_TEMPLATE),
    ("feature_card.html", FEATURE_CARD_TEMPLATE),
    ("contributor_card.html", CONTRIBUTOR_CARD_TEMPLATE),
    ("code_block.html", CODE_BLOCK_TEMPLATE),
    ("installation_step.html", INSTALLATION_STEP_TEMPLATE),
    ("nav_desktop.html", NAV_DESKTOP_TEMPLATE),
    ("nav_mobile.html", NAV_MOBILE_TEMPLATE),
    ("page.html", PAGE_TEMPLATE),
];

const BADGE_TEMPLATE: &str = r##"
<a href="{{ url }}" target="_blank" rel="noopener" class="badge-link">
  <img src="{{ image_source }}" alt="{{ alt_text }}" class="h-6">
</a>
"##;

const FEATURE_CARD_TEMPLATE: &str = r##"
<div class="feature-card rounded-2xl p-6">
  <h3 class="text-lg md:text-xl font-bold claude-primary mb-4 flex items-center">
    <i class="{{ icon_class }} mr-3"></i>
    {{ title }}
  </h3>
  {% if description %}<p class="text-sm text-gray-600 mb-4">{{ description }}</p>{% endif %}
  <div class="space-y-2 text-xs md:text-sm">
  {% for item in items %}
    <div class="flex justify-between">
      <code>{{ item.command }}</code>
      <span class="text-gray-600">{{ item.description }}</span>
    </div>
  {% endfor %}
  </div>
</div>
"##;

const CONTRIBUTOR_CARD_TEMPLATE: &str = r##"
<div class="feature-card rounded-2xl p-6 text-center group hover:scale-105 transition-transform duration-300">
  <a href="{% if is_placeholder %}#{% else %}https://github.com/{{ username }}{% endif %}" target="_blank" rel="noopener" class="block">
    <div class="w-20 h-20 md:w-24 md:h-24 mx-auto mb-4 rounded-full overflow-hidden border-4 border-orange-200 group-hover:border-orange-400 transition-colors{% if is_placeholder %} bg-gradient-to-br from-orange-100 to-orange-200 flex items-center justify-center{% endif %}">
      {% if is_placeholder %}<i class="fas fa-users text-2xl md:text-3xl claude-primary"></i>{% else %}<img src="https://github.com/{{ username }}.png" alt="{{ display_name }}" class="w-full h-full object-cover">{% endif %}
    </div>
    <h3 class="text-lg md:text-xl font-bold claude-primary mb-2">{{ display_name }}</h3>
    <p class="text-xs md:text-sm text-gray-600 mb-2">{{ role }}</p>
    <div class="flex justify-center space-x-2 text-xs">
    {% for tag in tags %}
      <span class="claude-bg-light px-2 py-1 rounded-full">{{ tag }}</span>
    {% endfor %}
    </div>
  </a>
</div>
"##;

const CODE_BLOCK_TEMPLATE: &str = r##"
<div class="bg-gray-900 text-green-400 rounded-lg p-3 md:p-4 font-mono text-xs md:text-sm overflow-x-auto relative group">
  <button onclick="copyToClipboard('{{ payload }}')" class="absolute top-2 right-2 bg-gray-700 hover:bg-gray-600 text-white px-2 py-1 rounded text-xs copy-button transition-all duration-300">
    <i class="fas fa-copy mr-1"></i>Copy
  </button>
  <pre><code class="language-{{ language }}">{{ code }}</code></pre>
</div>
"##;

const INSTALLATION_STEP_TEMPLATE: &str = r##"
<div class="installation-step rounded-2xl p-6 md:p-8">
  <div class="flex flex-col md:flex-row items-start space-y-4 md:space-y-0 md:space-x-6">
    <div class="flex-shrink-0 w-12 h-12 md:w-16 md:h-16 {{ bg_color }} text-white rounded-full flex items-center justify-center text-xl md:text-2xl font-bold mx-auto md:mx-0">
      {{ step_number }}
    </div>
    <div class="flex-1">
      <h3 class="text-xl md:text-2xl font-bold mb-4 mobile-center">{{ title }}</h3>
      {{ content | safe }}
    </div>
  </div>
</div>
"##;

const NAV_DESKTOP_TEMPLATE: &str = r##"{% for item in items %}
<a href="{{ item.href }}" class="hover:text-orange-600 transition-colors">{{ item.label }}</a>
{% endfor %}"##;

const NAV_MOBILE_TEMPLATE: &str = r##"{% for item in items %}
<a href="{{ item.href }}" class="hover:text-orange-600 transition-colors" onclick="toggleMobileMenu()">{{ item.label }}</a>
{% endfor %}"##;
