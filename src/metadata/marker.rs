use std::borrow::Cow;

/// A named, optionally valued tag attached to a type or one of its members.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Marker {
    name: Cow<'static, str>,
    value: Option<String>,
}

impl Marker {
    /// Creates a marker without a value.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Marker {
            name: name.into(),
            value: None,
        }
    }

    /// Creates a marker holding a value.
    #[must_use]
    pub fn with_value(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        Marker {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Gets the name of this marker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the value of this marker if it has one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// The markers attached to a type or member. Inserting a marker with a name
/// that is already present replaces it.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Markers(Vec<Marker>);

impl Markers {
    /// Creates an empty set of markers.
    #[must_use]
    pub fn new() -> Self {
        Markers(Vec::new())
    }

    /// Adds a marker, replacing any marker with the same name.
    pub fn insert(&mut self, marker: Marker) {
        match self.0.iter_mut().find(|m| m.name == marker.name) {
            Some(existing) => *existing = marker,
            None => self.0.push(marker),
        }
    }

    /// Checks whether a marker is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Gets a marker by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Marker> {
        self.0.iter().find(|m| m.name == name)
    }

    /// Gets the value of a marker by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Marker::value)
    }

    /// Iterates over the markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.0.iter()
    }
}

impl FromIterator<Marker> for Markers {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        let mut markers = Markers::new();
        for marker in iter {
            markers.insert(marker);
        }
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_with_same_name_is_replaced() {
        let mut markers = Markers::new();
        markers.insert(Marker::with_value("BindTo", "a"));
        markers.insert(Marker::with_value("BindTo", "b"));
        assert_eq!(Some("b"), markers.value("BindTo"));
        assert_eq!(1, markers.iter().count());
    }

    #[test]
    fn missing_marker_has_no_value() {
        let markers: Markers = vec![Marker::new("Default")].into_iter().collect();
        assert!(markers.has("Default"));
        assert!(markers.value("Default").is_none());
        assert!(!markers.has("Nullable"));
    }
}
