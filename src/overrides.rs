//! # Override Cascade Module
//!
//! Three-level configuration precedence for the six pluggable provider slots.
//!
//! A client can pick up provider overrides from three places, highest
//! precedence first:
//!
//! 1. **Explicit** — attached directly to the client declaration;
//! 2. **Type-level** — declared for the client type;
//! 3. **Package-level** — declared for the module the client lives in.
//!
//! Each slot is an `Option<String>` provider key where `None` is the default
//! sentinel. Merging takes the first non-default slot in precedence order.
//! The cascade is resolved once per client at build time and cached on the
//! client — never recomputed per method or per call.

/// Key a provider implementation registers under with the discovery
/// collaborator. The empty-by-default sentinel is represented as `None` in a
/// slot.
pub type ProviderKey = String;

/// Six independent provider slots. `None` means "use the default
/// implementation".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderSlots {
    pub body_serializer: Option<ProviderKey>,
    pub param_path_builder: Option<ProviderKey>,
    pub object_converter: Option<ProviderKey>,
    pub transport_config: Option<ProviderKey>,
    pub error_handler: Option<ProviderKey>,
    pub uri_handler: Option<ProviderKey>,
}

impl ProviderSlots {
    /// Merge two slot sets, preferring `first`. Identical sets short-circuit;
    /// otherwise each default-sentinel slot of `first` takes the
    /// corresponding slot of `second`.
    #[must_use]
    pub fn merge(first: &ProviderSlots, second: &ProviderSlots) -> ProviderSlots {
        if first == second {
            return first.clone();
        }
        ProviderSlots {
            body_serializer: prefer(&first.body_serializer, &second.body_serializer),
            param_path_builder: prefer(&first.param_path_builder, &second.param_path_builder),
            object_converter: prefer(&first.object_converter, &second.object_converter),
            transport_config: prefer(&first.transport_config, &second.transport_config),
            error_handler: prefer(&first.error_handler, &second.error_handler),
            uri_handler: prefer(&first.uri_handler, &second.uri_handler),
        }
    }

    /// Resolve the full cascade: `merge(explicit, merge(type, package))`.
    /// Absent levels drop out; with neither type- nor package-level present
    /// the explicit set is used directly.
    #[must_use]
    pub fn resolve(
        explicit: &ProviderSlots,
        type_level: Option<&ProviderSlots>,
        package_level: Option<&ProviderSlots>,
    ) -> ProviderSlots {
        match (type_level, package_level) {
            (None, None) => explicit.clone(),
            (Some(type_level), None) => Self::merge(explicit, type_level),
            (None, Some(package_level)) => Self::merge(explicit, package_level),
            (Some(type_level), Some(package_level)) => {
                Self::merge(explicit, &Self::merge(type_level, package_level))
            }
        }
    }
}

fn prefer(first: &Option<ProviderKey>, second: &Option<ProviderKey>) -> Option<ProviderKey> {
    match first {
        Some(key) => Some(key.clone()),
        None => second.clone(),
    }
}
