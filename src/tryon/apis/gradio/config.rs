use std::time::Duration;

use reqwest::Url;

use crate::app::envy::Envy;

use super::enums::image_encoding::ImageEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct GradioConfig {
    pub endpoints: Vec<String>,
    pub encoding: ImageEncoding,
    pub request_timeout: Duration,
    pub poll_policy: PollPolicy,
}

impl GradioConfig {
    pub fn from_envy(envy: &Envy) -> Result<Self, String> {
        let endpoints = render_endpoints(
            &envy.gradio_endpoint_templates,
            &envy.gradio_base_url,
            &envy.gradio_api_name,
        )?;

        Ok(Self {
            endpoints,
            encoding: envy.gradio_image_encoding.parse()?,
            request_timeout: Duration::from_millis(envy.gradio_request_timeout_ms),
            poll_policy: PollPolicy {
                max_attempts: envy.gradio_max_attempts,
                interval: Duration::from_millis(envy.gradio_poll_interval_ms),
            },
        })
    }
}

/// Expands `{base}` and `{api_name}` in each template, keeping order.
pub fn render_endpoints(
    templates: &[String],
    base_url: &str,
    api_name: &str,
) -> Result<Vec<String>, String> {
    let base_url = base_url.trim().trim_end_matches('/');
    let mut endpoints = Vec::with_capacity(templates.len());

    for template in templates {
        let template = template.trim();
        if template.is_empty() {
            continue;
        }

        let endpoint = template
            .replace("{base}", base_url)
            .replace("{api_name}", api_name);

        if let Err(e) = Url::parse(&endpoint) {
            return Err(format!("invalid endpoint \"{}\": {}", endpoint, e));
        }

        endpoints.push(endpoint);
    }

    if endpoints.is_empty() {
        return Err("no gradio endpoint templates configured".to_string());
    }

    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn renders_templates_in_order() {
        let endpoints = render_endpoints(
            &templates(&["{base}/call/{api_name}", "{base}/gradio_api/call/{api_name}"]),
            "https://mukhammed19-virtual-try-on-app.hf.space/",
            "virtual_tryon",
        )
        .unwrap();

        assert_eq!(
            endpoints,
            vec![
                "https://mukhammed19-virtual-try-on-app.hf.space/call/virtual_tryon",
                "https://mukhammed19-virtual-try-on-app.hf.space/gradio_api/call/virtual_tryon",
            ]
        );
    }

    #[test]
    fn rejects_unparseable_endpoints() {
        let result = render_endpoints(&templates(&["{base}/call"]), "not a url", "virtual_tryon");

        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_template_list() {
        let result = render_endpoints(&templates(&[" "]), "https://x.hf.space", "virtual_tryon");

        assert!(result.is_err());
    }
}
