//! Two-pass construction of a `SchemaModel` from the element tree
//!
//! Pass one creates every entity and attribute and indexes the document's
//! identifiers. Pass two resolves key members and relationship targets, so the
//! order of entities in the document never matters.

use super::grammar as g;
use super::xml::XmlNode;
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{
    Attribute, AttributeId, Diagram, Entity, EntityId, Key, KeyKind, KeyReference, Properties,
    ResolutionWarning, SchemaModel,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Key members as written in the document, resolved in pass two
#[derive(Debug, Default)]
struct PendingKeys {
    primary: Option<(Option<String>, Vec<String>)>,
    unique: Vec<(Option<String>, Vec<String>)>,
}

#[derive(Debug, Default)]
struct Index {
    entities: HashMap<String, EntityId>,
    attributes: HashMap<String, AttributeId>,
}

/// Select the element holding the model of the requested version
///
/// Without a requested number the current version (the one without a
/// `VERSIONNUMBER`) is used, falling back to the last version in the document.
pub(crate) fn select_version<'a>(root: &'a XmlNode, requested: Option<&str>) -> Result<&'a XmlNode> {
    let versions: Vec<&XmlNode> = root.children_named(g::VERSION).collect();
    if versions.is_empty() {
        return Ok(root);
    }

    if let Some(requested) = requested {
        return versions
            .iter()
            .find(|v| version_number(v) == Some(requested.trim()))
            .copied()
            .ok_or_else(|| {
                MappingError::parse_at(
                    format!("model version '{requested}' not found"),
                    g::VERSION,
                )
            });
    }

    let current = versions
        .iter()
        .find(|v| version_number(v).is_none())
        .or_else(|| versions.last())
        .copied()
        .unwrap_or(root);
    debug!(
        "Reading model version {}",
        version_number(current).unwrap_or("current")
    );
    Ok(current)
}

fn version_number(version: &XmlNode) -> Option<&str> {
    version
        .text_at(&[g::VERSION_INFO, g::VERSION_NUMBER])
        .map(str::trim)
}

/// Build the model held by a version scope
pub(crate) fn build_model(scope: &XmlNode) -> Result<SchemaModel> {
    let dictionary = scope.child(g::DATADICT).unwrap_or(scope);
    let udp_names = udp_dictionary(dictionary);

    let mut model = SchemaModel::default();
    let mut index = Index::default();
    let mut pending = Vec::new();

    for (position, ent) in dictionary.all(&[g::ENTITIES, g::ENTITY]).enumerate() {
        let path = format!("{}/{}[{}]", g::ENTITIES, g::ENTITY, position + 1);
        let id = EntityId(position);
        let (entity, keys) = read_entity(ent, id, &path, &udp_names, &mut index)?;
        if let Some(source_id) = &entity.source_id {
            index.entities.insert(source_id.clone(), id);
        }
        model.entities.push(entity);
        pending.push(keys);
    }

    for (entity, keys) in model.entities.iter_mut().zip(pending) {
        resolve_local_keys(entity, keys, &index);
    }
    resolve_relationships(dictionary, &mut model, &index);
    model.diagrams = read_diagrams(scope, dictionary, &index);

    Ok(model)
}

fn udp_dictionary(dictionary: &XmlNode) -> HashMap<String, String> {
    dictionary
        .all(&[g::UDP_DICTIONARY, g::UDP_DEFINITION])
        .filter_map(|udp| {
            let id = udp.text_at(&[g::ID])?;
            let name = udp.text_at(&[g::NAME])?;
            Some((id.trim().to_string(), name.trim().to_string()))
        })
        .collect()
}

/// Name of a user-defined property element
///
/// Tags are `UDP_<x>` where `<x>` is either a dictionary identifier or the
/// property name itself.
fn property_name(tag: &str, udp_names: &HashMap<String, String>) -> String {
    let key = tag.strip_prefix(g::UDP_TAG_PREFIX).unwrap_or(tag);
    udp_names
        .get(key)
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

fn read_properties(node: &XmlNode, udp_names: &HashMap<String, String>) -> Properties {
    node.child(g::UDP_VALUES)
        .map(|props| {
            props
                .children
                .iter()
                .map(|p| (property_name(&p.name, udp_names), p.text.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn owned_text(node: &XmlNode, path: &[&str]) -> Option<String> {
    node.text_at(path).map(ToString::to_string)
}

fn member_ids(node: &XmlNode) -> Vec<String> {
    node.all(&[g::MEMBER_IDS, g::MEMBER_ID])
        .map(|m| m.text.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

fn read_entity(
    ent: &XmlNode,
    id: EntityId,
    path: &str,
    udp_names: &HashMap<String, String>,
    index: &mut Index,
) -> Result<(Entity, PendingKeys)> {
    let name = ent
        .text_at(&[g::NAME])
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| MappingError::parse_at("entity has no NAME", path))?
        .to_string();

    let mut attributes = Vec::new();
    for (position, attr) in ent.all(&[g::ATTRIBUTES, g::ATTRIBUTE]).enumerate() {
        let attr_path = format!("{path}/{}/{}[{}]", g::ATTRIBUTES, g::ATTRIBUTE, position + 1);
        let attr_id = AttributeId {
            entity: id,
            index: position,
        };
        let attribute = read_attribute(attr, attr_id, &attr_path, udp_names)?;
        if let Some(source_id) = &attribute.source_id {
            index.attributes.insert(source_id.clone(), attr_id);
        }
        attributes.push(attribute);
    }

    let keys = PendingKeys {
        primary: ent
            .child(g::PRIMARY_KEY)
            .map(|pk| (owned_text(pk, &[g::NAME]), member_ids(pk))),
        unique: ent
            .all(&[g::UNIQUE_KEYS, g::UNIQUE_KEY])
            .map(|uk| (owned_text(uk, &[g::NAME]), member_ids(uk)))
            .collect(),
    };

    let entity = Entity {
        id,
        source_id: ent.text_at(&[g::ID]).map(|s| s.trim().to_string()),
        name,
        description: owned_text(ent, &[g::DESCRIPTION]),
        schema: owned_text(ent, &[g::SCHEMA]),
        attributes,
        keys: Vec::new(),
        properties: read_properties(ent, udp_names),
    };
    Ok((entity, keys))
}

fn read_attribute(
    attr: &XmlNode,
    id: AttributeId,
    path: &str,
    udp_names: &HashMap<String, String>,
) -> Result<Attribute> {
    let name = attr
        .text_at(&[g::NAME])
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| MappingError::parse_at("attribute has no NAME", path))?
        .to_string();

    let data_type = attr
        .text_at(&[g::DATA_TYPE, g::DATA_TYPE_NAME])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            MappingError::parse_at(format!("attribute '{name}' has no data type"), path)
        })?
        .to_string();

    let nullable = match attr.text_at(&[g::NOT_NULL, g::VALUE]).map(str::trim) {
        Some(g::NOT_NULL_SET) => Some(false),
        Some(g::NOT_NULL_CLEAR) => Some(true),
        _ => None,
    };

    Ok(Attribute {
        id,
        source_id: attr.text_at(&[g::ID]).map(|s| s.trim().to_string()),
        name,
        description: owned_text(attr, &[g::DESCRIPTION]),
        data_type,
        nullable,
        ordinal: u32::try_from(id.index + 1).unwrap_or(u32::MAX),
        properties: read_properties(attr, udp_names),
    })
}

/// Resolve member identifiers that must belong to `owner`
fn resolve_members(
    key_name: &str,
    owner: EntityId,
    ids: &[String],
    index: &Index,
    warnings: &mut Vec<ResolutionWarning>,
) -> Vec<AttributeId> {
    let mut members = Vec::with_capacity(ids.len());
    for raw in ids {
        match index.attributes.get(raw) {
            Some(attr) if attr.entity == owner => members.push(*attr),
            _ => {
                warn!("Key '{key_name}' lists attribute '{raw}' outside its entity");
                warnings.push(ResolutionWarning::UnresolvedKeyMember {
                    key: key_name.to_string(),
                    member: raw.clone(),
                });
            }
        }
    }
    members
}

fn local_key(
    kind: KeyKind,
    name: String,
    owner: EntityId,
    ids: &[String],
    index: &Index,
) -> Key {
    let mut warnings = Vec::new();
    let members = resolve_members(&name, owner, ids, index, &mut warnings);
    Key {
        name,
        kind,
        members,
        reference: None,
        warnings,
    }
}

fn resolve_local_keys(entity: &mut Entity, pending: PendingKeys, index: &Index) {
    if let Some((name, ids)) = pending.primary
        && (name.is_some() || !ids.is_empty())
    {
        let name = name.unwrap_or_else(|| format!("PK_{}", entity.name));
        entity
            .keys
            .push(local_key(KeyKind::Primary, name, entity.id, &ids, index));
    }

    for (position, (name, ids)) in pending.unique.into_iter().enumerate() {
        let name = name.unwrap_or_else(|| format!("UK_{}_{}", entity.name, position + 1));
        entity
            .keys
            .push(local_key(KeyKind::Other, name, entity.id, &ids, index));
    }
}

fn resolve_relationships(dictionary: &XmlNode, model: &mut SchemaModel, index: &Index) {
    for rel in dictionary.all(&[g::RELATIONSHIPS, g::RELATIONSHIP]) {
        let child_ref = rel.text_at(&[g::CHILD]).map(str::trim).unwrap_or_default();
        let parent_ref = rel.text_at(&[g::PARENT]).map(str::trim).unwrap_or_default();

        let Some(&child) = index.entities.get(child_ref) else {
            let key = rel
                .text_at(&[g::NAME])
                .or_else(|| rel.text_at(&[g::ID]))
                .unwrap_or_default()
                .to_string();
            warn!("Relationship '{key}' has unknown child entity '{child_ref}'");
            model.warnings.push(ResolutionWarning::DanglingForeignKey {
                key,
                target: child_ref.to_string(),
            });
            continue;
        };

        let target = index.entities.get(parent_ref).copied();
        let target_entity = target.and_then(|id| model.entity(id));
        let target_name = target_entity.map(|e| e.name.clone());
        let target_key = target_entity
            .and_then(|e| e.keys_of(KeyKind::Primary).next())
            .map(|k| k.name.clone());

        let Some(owner) = model.entities.get_mut(child.0) else {
            continue;
        };
        let name = owned_text(rel, &[g::NAME]).unwrap_or_else(|| {
            format!(
                "FK_{}_{}",
                owner.name,
                target_name.as_deref().unwrap_or(parent_ref)
            )
        });

        let ids: Vec<String> = rel
            .all(&[g::PAIRS, g::PAIR])
            .filter_map(|pair| pair.text_at(&[g::CHILD_MEMBER]))
            .map(|id| id.trim().to_string())
            .collect();

        let mut warnings = Vec::new();
        let members = resolve_members(&name, owner.id, &ids, index, &mut warnings);
        if target.is_none() {
            warn!(
                "Foreign key '{name}' of '{}' references unknown entity '{parent_ref}'",
                owner.name
            );
            warnings.push(ResolutionWarning::DanglingForeignKey {
                key: name.clone(),
                target: parent_ref.to_string(),
            });
        }

        owner.keys.push(Key {
            name,
            kind: KeyKind::Foreign,
            members,
            reference: Some(KeyReference {
                target_source_id: parent_ref.to_string(),
                target_entity: target,
                target_name,
                target_key,
            }),
            warnings,
        });
    }
}

fn read_diagrams(scope: &XmlNode, dictionary: &XmlNode, index: &Index) -> Vec<Diagram> {
    let Some(diagrams) = scope
        .child(g::DIAGRAMS)
        .or_else(|| dictionary.child(g::DIAGRAMS))
    else {
        return Vec::new();
    };

    let mut result: Vec<(Option<String>, Diagram)> = diagrams
        .children_named(g::DIAGRAM)
        .map(|d| {
            (
                d.text_at(&[g::ID]).map(|s| s.trim().to_string()),
                Diagram {
                    name: d.text_at(&[g::NAME]).unwrap_or_default().to_string(),
                    entities: Vec::new(),
                },
            )
        })
        .collect();

    for control in diagrams.all(&[g::CONTROLS, g::ENTITY_CONTROLS, g::ENTITY_CONTROL]) {
        let entity_ref = control.text_at(&[g::ID]).map(str::trim).unwrap_or_default();
        let diagram_ref = control.text_at(&[g::DIAGRAM_ID]).map(str::trim);
        let Some(&entity) = index.entities.get(entity_ref) else {
            debug!("Diagram control refers to unknown entity '{entity_ref}'");
            continue;
        };
        let diagram = result
            .iter_mut()
            .find(|(id, _)| id.as_deref() == diagram_ref)
            .map(|(_, d)| d);
        if let Some(diagram) = diagram
            && !diagram.entities.contains(&entity)
        {
            diagram.entities.push(entity);
        }
    }

    result.into_iter().map(|(_, d)| d).collect()
}
