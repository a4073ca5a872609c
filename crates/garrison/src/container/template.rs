//! Container templates and image references.

use std::sync::Arc;

use garrison_common::Identifiable;

use crate::runtime::ContainerAttrs;

/// Image a container was built from. Display and lookup only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Image reference (`repository:tag`), or the ID if untagged.
    pub name: String,
    /// Image ID.
    pub id: String,
}

impl ImageRef {
    /// Create an image reference.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Read the image reference from a container's attributes.
    #[must_use]
    pub fn from_attrs(attrs: &ContainerAttrs) -> Self {
        let name = attrs
            .image_reference()
            .map_or_else(|| attrs.image.clone(), ToString::to_string);
        Self::new(name, attrs.image.clone())
    }
}

impl Identifiable for ImageRef {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Local model of a container before (or while) it exists in the runtime.
#[derive(Debug, Clone)]
pub struct ContainerTemplate {
    /// Container name.
    pub name: String,
    /// Hostname inside the container.
    pub hostname: String,
    /// Image to build the container from.
    pub image: Arc<ImageRef>,
}

impl ContainerTemplate {
    /// Create a template for `name` built from `image`.
    #[must_use]
    pub fn new(name: impl Into<String>, image: Arc<ImageRef>) -> Self {
        let name = name.into();
        Self {
            hostname: name.clone(),
            name,
            image,
        }
    }
}

impl Identifiable for ContainerTemplate {
    fn key(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ContainerConfigAttrs;

    #[test]
    fn image_from_tagged_container() {
        let attrs = ContainerAttrs {
            image: "sha256:feed".into(),
            config: Some(ContainerConfigAttrs {
                image: Some("garrison:full".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let image = ImageRef::from_attrs(&attrs);
        assert_eq!(image.key(), "garrison:full");
        assert_eq!(image.id, "sha256:feed");
    }

    #[test]
    fn image_from_untagged_container() {
        let attrs = ContainerAttrs {
            image: "sha256:feed".into(),
            ..Default::default()
        };
        assert_eq!(ImageRef::from_attrs(&attrs).name, "sha256:feed");
    }

    #[test]
    fn template_defaults_hostname_to_name() {
        let template = ContainerTemplate::new("lab", Arc::new(ImageRef::new("garrison:light", "x")));
        assert_eq!(template.hostname, "lab");
        assert_eq!(template.key(), "lab");
    }
}
