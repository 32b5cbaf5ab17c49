//! Method resolution: message, id and overload identity per method family.

mod method;

pub use method::*;

use crate::prelude::*;
use std::collections::BTreeMap;

///
/// ResolvedInterface
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResolvedInterface {
    pub descriptor: InterfaceDescriptor,
    pub methods: Vec<ResolvedMethod>,
}

impl ResolvedInterface {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.descriptor.path
    }

    /// Methods sharing the (name, format-parameter-count) key.
    pub fn family<'a>(&'a self, key: &'a FamilyKey) -> impl Iterator<Item = &'a ResolvedMethod> {
        self.methods.iter().filter(move |m| &m.key() == key)
    }
}

///
/// resolve
/// resolves every method visible on an interface; diagnostics are collected, never raised
///

pub fn resolve(
    index: &MethodIndex<'_>,
    path: &str,
    diags: &mut Diagnostics,
) -> Option<ResolvedInterface> {
    let methods = match index.methods_of(path) {
        Ok(methods) => methods,
        Err(diagnostic) => {
            diags.push(diagnostic);
            return None;
        }
    };
    let descriptor = index.source().interface(path)?.clone();

    // group by simple name, then by format-parameter-count
    let mut families: BTreeMap<FamilyKey, Vec<usize>> = BTreeMap::new();
    let mut counts_by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (i, scoped) in methods.iter().enumerate() {
        let key = FamilyKey::of(&scoped.decl);
        let counts = counts_by_name.entry(scoped.decl.name.as_str()).or_default();
        if !counts.contains(&key.count) {
            counts.push(key.count);
        }
        families.entry(key).or_default().push(i);
    }

    // owned message per family
    let mut owned: BTreeMap<&FamilyKey, Message> = BTreeMap::new();

    for (key, members) in &families {
        let owners: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| methods[i].decl.message.is_some())
            .collect();

        if owners.len() > 1 {
            for &i in &owners {
                err!(
                    diags,
                    methods[i].origin(),
                    "Only one message with the same format parameters is allowed. '{}' with {} format parameter(s) is declared {} times.",
                    key.name,
                    key.count,
                    owners.len()
                );
            }
        }

        if let Some(decl) = owners
            .first()
            .and_then(|&owner| methods[owner].decl.message.as_ref())
        {
            owned.insert(key, resolve_id(Message::from_decl(decl), &key.name, &methods));
        }
    }

    let mut resolved: Vec<Option<ResolvedMethod>> = vec![None; methods.len()];

    for (key, members) in &families {
        // a family without an owner falls back to the first same-named family that has one
        let source = owned
            .get_key_value(key)
            .or_else(|| owned.iter().find(|(other, _)| other.name == key.name));
        let message_key = source.map(|(k, _)| (**k).clone());
        let message = source.map(|(_, m)| m.clone());

        let overloaded = counts_by_name
            .get(key.name.as_str())
            .is_some_and(|counts| counts.len() > 1);

        for &i in members {
            let scoped = &methods[i];
            resolved[i] = Some(ResolvedMethod {
                interface: scoped.interface.clone(),
                decl: scoped.decl.clone(),
                format_param_count: key.count,
                message: message.clone(),
                message_key: message_key.clone(),
                inherits_message: scoped.decl.message.is_none() && message.is_some(),
                overloaded,
            });
        }
    }

    let methods: Vec<ResolvedMethod> = resolved.into_iter().flatten().collect();

    tracing::debug!(
        target: "msgtools",
        stage = "resolve",
        interface = %descriptor.path,
        methods = methods.len(),
        families = families.len(),
    );

    Some(ResolvedInterface {
        descriptor,
        methods,
    })
}

// An inherited id is taken from any same-named method that owns a concrete id,
// regardless of its format-parameter-count.
fn resolve_id(mut message: Message, name: &str, methods: &[ScopedMethod]) -> Message {
    if message.id != MessageId::Inherit {
        return message;
    }

    let inherited = methods
        .iter()
        .filter(|m| m.decl.name == name)
        .filter_map(|m| m.decl.message.as_ref())
        .find(|decl| decl.id.has_id());

    if let Some(decl) = inherited {
        message.id = decl.id;
        message.id_inherited = true;
    }

    message
}
