//! Output-to-input type conversion.
//!
//! Object silks may stand in argument position; their object types are
//! converted to input object types on demand. Conversions are memoized
//! per weave by type name. Two distinct definitions claiming the same
//! name abort the weave.

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use crate::{
    errors::WeaveError,
    resolver::InputSpec,
    silk::{InputObjectType, MetaType, ObjectType},
};

struct InputEntry {
    source: Arc<ObjectType>,
    converted: Arc<InputObjectType>,
}

/// Per-weave memo of object-to-input conversions.
#[derive(Default)]
pub(crate) struct InputMap {
    entries: HashMap<String, InputEntry>,
}

impl InputMap {
    /// The input-position form of `ty`. Scalars, enums and input objects
    /// pass through; objects are converted; abstract types are rejected.
    pub(crate) fn ensure_input_type(&mut self, ty: &MetaType) -> Result<MetaType, WeaveError> {
        match ty {
            MetaType::Scalar(_) | MetaType::Enum(_) | MetaType::InputObject(_) => Ok(ty.clone()),
            MetaType::Object(object) => {
                Ok(MetaType::InputObject(self.to_input_object_type(object)?))
            }
            MetaType::Interface(interface) => Err(WeaveError::AbstractInput {
                kind: "interface",
                name: interface.name.clone(),
            }),
            MetaType::Union(union) => Err(WeaveError::AbstractInput {
                kind: "union",
                name: union.name.clone(),
            }),
            MetaType::List(inner) => Ok(MetaType::list(self.ensure_input_type(inner)?)),
            MetaType::NonNull(inner) => Ok(MetaType::non_null(self.ensure_input_type(inner)?)),
        }
    }

    /// Converts an object type to an input object type, reusing an earlier
    /// conversion of the same definition.
    pub(crate) fn to_input_object_type(
        &mut self,
        object: &Arc<ObjectType>,
    ) -> Result<Arc<InputObjectType>, WeaveError> {
        if let Some(entry) = self.entries.get(&object.name) {
            if Arc::ptr_eq(&entry.source, object) {
                return Ok(Arc::clone(&entry.converted));
            }
            return Err(WeaveError::InputTypeExists(object.name.clone()));
        }

        let mut fields = IndexMap::new();
        for (name, field) in &object.fields {
            let mut converted = field.clone();
            converted.ty = self.ensure_input_type(&field.ty)?;
            fields.insert(name.clone(), converted);
        }
        let converted = Arc::new(InputObjectType {
            name: object.name.clone(),
            fields,
        });
        self.entries.insert(
            object.name.clone(),
            InputEntry {
                source: Arc::clone(object),
                converted: Arc::clone(&converted),
            },
        );
        Ok(converted)
    }

    /// Lowers a field's declared input into the per-argument types the
    /// engine sees. `None` means the field takes no arguments.
    pub(crate) fn input_to_args(
        &mut self,
        input: &InputSpec,
    ) -> Result<Option<IndexMap<String, MetaType>>, WeaveError> {
        match input {
            InputSpec::None => Ok(None),
            InputSpec::Record(silks) => {
                let mut args = IndexMap::new();
                for (name, silk) in silks {
                    args.insert(name.clone(), self.ensure_input_type(silk.ty())?);
                }
                Ok(Some(args))
            }
            InputSpec::Object(silk) => match silk.ty().named_type() {
                MetaType::Object(object) => {
                    let mut args = IndexMap::new();
                    for (name, field) in &object.fields {
                        args.insert(name.clone(), self.ensure_input_type(&field.ty)?);
                    }
                    // Conversion is registered so a later use of the same
                    // name with a different definition is caught.
                    self.to_input_object_type(object)?;
                    Ok(Some(args))
                }
                MetaType::InputObject(input_object) => {
                    let mut args = IndexMap::new();
                    for (name, field) in &input_object.fields {
                        args.insert(name.clone(), field.ty.clone());
                    }
                    Ok(Some(args))
                }
                MetaType::Interface(interface) => Err(WeaveError::AbstractInput {
                    kind: "interface",
                    name: interface.name.clone(),
                }),
                MetaType::Union(union) => Err(WeaveError::AbstractInput {
                    kind: "union",
                    name: union.name.clone(),
                }),
                other => Err(WeaveError::InvalidInput(
                    other.name().unwrap_or(other.kind()).to_string(),
                )),
            },
        }
    }
}
