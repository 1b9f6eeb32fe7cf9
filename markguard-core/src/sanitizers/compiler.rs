//! compiler.rs - Manages the compilation and caching of filter policies.
//!
//! A `FilterPolicy` is written for humans: mixed-case names, ordered sets. The
//! pipeline wants lowercase hash lookups. This module converts one into the
//! other and keeps a thread-safe, global cache so engines built from the same
//! policy share a single `CompiledPolicy`.
//!
//! The cache only ever holds read-only lookup tables. Per-call state such as the
//! open-tag counter lives in `FilterContext` and is never cached.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::debug;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::FilterPolicy;

/// Upper bound on distinct policies kept in the cache before it is flushed.
const MAX_CACHED_POLICIES: usize = 64;

/// The lookup-table form of a `FilterPolicy`.
///
/// Tag, attribute and protocol names are lowercased. Entity names are kept
/// verbatim because character references are case-sensitive (`&AMP;` is not
/// `&amp;`).
#[derive(Debug)]
pub struct CompiledPolicy {
    allowed_tags: HashMap<String, HashSet<String>>,
    no_close_tags: HashSet<String>,
    always_close_tags: HashSet<String>,
    /// Kept ordered so blank-tag removal is deterministic.
    remove_blank_tags: Vec<String>,
    protocol_attributes: HashSet<String>,
    allowed_protocols: HashSet<String>,
    allowed_entities: HashSet<String>,
    pub strip_comments: bool,
    pub auto_repair_brackets: bool,
    pub allow_numbered_entities: bool,
    pub normalize_ascii_entities: bool,
    source: FilterPolicy,
}

fn lowercase_set<'a>(names: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    names.into_iter().map(|n| n.to_ascii_lowercase()).collect()
}

impl CompiledPolicy {
    /// Builds the lookup tables for `policy`. Compilation never fails: names
    /// that can never match (see `FilterPolicy::validate`) are simply inert.
    pub fn compile(policy: &FilterPolicy) -> Self {
        let mut allowed_tags: HashMap<String, HashSet<String>> = HashMap::new();
        for (tag, attributes) in &policy.allowed_tags {
            allowed_tags
                .entry(tag.to_ascii_lowercase())
                .or_default()
                .extend(attributes.iter().map(|a| a.to_ascii_lowercase()));
        }

        let mut remove_blank_tags: Vec<String> =
            lowercase_set(&policy.remove_blank_tags).into_iter().collect();
        remove_blank_tags.sort();

        Self {
            allowed_tags,
            no_close_tags: lowercase_set(&policy.no_close_tags),
            always_close_tags: lowercase_set(&policy.always_close_tags),
            remove_blank_tags,
            protocol_attributes: lowercase_set(&policy.protocol_attributes),
            allowed_protocols: lowercase_set(&policy.allowed_protocols),
            allowed_entities: policy.allowed_entities.iter().cloned().collect(),
            strip_comments: policy.strip_comments,
            auto_repair_brackets: policy.auto_repair_brackets,
            allow_numbered_entities: policy.allow_numbered_entities,
            normalize_ascii_entities: policy.normalize_ascii_entities,
            source: policy.clone(),
        }
    }

    /// `tag` must already be lowercase.
    pub fn is_allowed_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains_key(tag)
    }

    /// `tag` and `attribute` must already be lowercase.
    pub fn is_allowed_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.allowed_tags
            .get(tag)
            .is_some_and(|attributes| attributes.contains(attribute))
    }

    pub fn is_no_close(&self, tag: &str) -> bool {
        self.no_close_tags.contains(tag)
    }

    pub fn is_always_close(&self, tag: &str) -> bool {
        self.always_close_tags.contains(tag)
    }

    pub fn remove_blank_tags(&self) -> &[String] {
        &self.remove_blank_tags
    }

    pub fn is_protocol_attribute(&self, attribute: &str) -> bool {
        self.protocol_attributes.contains(attribute)
    }

    /// Case-insensitive: `HTTP` is allowed when `http` is.
    pub fn is_allowed_protocol(&self, scheme: &str) -> bool {
        self.allowed_protocols.contains(&scheme.to_ascii_lowercase())
    }

    /// Exact match against the named-entity allow-list.
    pub fn is_allowed_entity(&self, name: &str) -> bool {
        self.allowed_entities.contains(name)
    }

    /// The policy this was compiled from.
    pub fn source(&self) -> &FilterPolicy {
        &self.source
    }
}

lazy_static! {
    /// A thread-safe, global cache for compiled policies.
    /// The key is a hash of the `FilterPolicy`.
    static ref COMPILED_POLICY_CACHE: RwLock<HashMap<u64, Arc<CompiledPolicy>>> = RwLock::new(HashMap::new());
}

/// Hashes the `FilterPolicy` to create a stable key for the cache. The policy's
/// collections are ordered, so equal policies always hash equally.
fn hash_policy(policy: &FilterPolicy) -> u64 {
    let mut hasher = DefaultHasher::new();
    policy.hash(&mut hasher);
    hasher.finish()
}

/// Gets a `CompiledPolicy` from the cache or compiles it if not found.
///
/// A cache hit is only served when the cached entry was compiled from an equal
/// policy, so a hash collision can never hand out another policy's allow-lists.
pub fn get_or_compile_policy(policy: &FilterPolicy) -> Arc<CompiledPolicy> {
    let cache_key = hash_policy(policy);

    {
        let cache = COMPILED_POLICY_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(compiled) = cache.get(&cache_key) {
            if compiled.source() == policy {
                debug!("Serving compiled policy from cache for key: {}", cache_key);
                return Arc::clone(compiled);
            }
            debug!("Cache key {} collides with a different policy; compiling uncached.", cache_key);
            return Arc::new(CompiledPolicy::compile(policy));
        }
    }

    debug!("Compiled policy not found in cache. Compiling now.");
    let compiled = Arc::new(CompiledPolicy::compile(policy));

    let mut cache = COMPILED_POLICY_CACHE.write().unwrap_or_else(|e| e.into_inner());
    if cache.len() >= MAX_CACHED_POLICIES {
        debug!("Policy cache full ({} entries); flushing.", cache.len());
        cache.clear();
    }
    cache.insert(cache_key, Arc::clone(&compiled));

    debug!("Successfully compiled and cached policy for key: {}", cache_key);
    compiled
}
