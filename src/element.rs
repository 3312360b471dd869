//! Column storage of one decoded element and its typed lookups.

use fxhash::FxHashMap;

use crate::{
    Error,
    header::{ElementDef, PropertyType},
    property::{ListColumn, Property, ValueColumn},
    scalar::{ListLenType, Scalar},
};


/// All decoded rows of one element, stored column-wise.
///
/// Properties keep their declaration order. Lookups by name go through a
/// side index, and the typed getters check that the requested shape and
/// scalar type match what the file declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    count: u64,
    names: Vec<String>,
    properties: Vec<Property>,
    index: FxHashMap<String, usize>,
}

impl Element {
    /// Creates an element with empty columns according to `def`. Property
    /// names are already known to be unique.
    pub(crate) fn from_def(def: &ElementDef) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(def.property_defs.len());

        let mut names = Vec::with_capacity(def.property_defs.len());
        let mut properties = Vec::with_capacity(def.property_defs.len());
        for (i, prop) in def.property_defs.iter().enumerate() {
            index.insert(prop.name.clone(), i);
            names.push(prop.name.clone());
            properties.push(Property::new(prop.ty, def.count));
        }

        Self {
            name: def.name.clone(),
            count: def.count,
            names,
            properties,
            index,
        }
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of rows as declared in the header. Every column has exactly
    /// this many rows.
    pub fn size(&self) -> u64 {
        self.count
    }

    /// Number of properties.
    pub fn num_properties(&self) -> usize {
        self.properties.len()
    }

    /// Iterates over all properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> + '_ {
        self.names.iter().map(|n| n.as_str()).zip(&self.properties)
    }

    pub fn contains_property(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns `true` if there is a value (non-list) property with the given
    /// name and scalar type `T`.
    pub fn contains_value_property<T: Scalar>(&self, name: &str) -> bool {
        self.get(name).and_then(T::value_column).is_some()
    }

    /// Returns `true` if there is a list property with the given name and
    /// scalar type `T`. The length type does not matter.
    pub fn contains_list_property<T: Scalar>(&self, name: &str) -> bool {
        self.get(name).and_then(T::list_column).is_some()
    }

    /// Returns the dynamically typed column of the given property.
    pub fn property(&self, name: &str) -> Result<&Property, Error> {
        self.get(name).ok_or_else(|| Error::PropertyNotFound {
            element: self.name.clone(),
            property: name.to_string(),
        })
    }

    /// Returns the column of the value property `name` with scalar type `T`.
    ///
    /// Fails with `PropertyNotFound` if there is no such property and with
    /// `TypeMismatch` if it is a list or has a different scalar type.
    pub fn value_property<T: Scalar>(&self, name: &str) -> Result<&ValueColumn<T>, Error> {
        let prop = self.property(name)?;
        T::value_column(prop).ok_or_else(|| {
            self.mismatch(name, PropertyType::Scalar(T::KIND), prop)
        })
    }

    /// Returns the column of the list property `name` with scalar type `T`.
    ///
    /// Fails with `PropertyNotFound` if there is no such property and with
    /// `TypeMismatch` if it is not a list or has a different scalar type.
    pub fn list_property<T: Scalar>(&self, name: &str) -> Result<&ListColumn<T>, Error> {
        let prop = self.property(name)?;
        T::list_column(prop).ok_or_else(|| {
            // The length type is not part of the request; report the declared
            // one (if any) so that only the relevant difference shows up.
            let len_type = prop.ty().len_type().unwrap_or(ListLenType::UInt8);
            let expected = PropertyType::List { len_type, scalar_type: T::KIND };
            self.mismatch(name, expected, prop)
        })
    }

    fn get(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    fn mismatch(&self, name: &str, expected: PropertyType, found: &Property) -> Error {
        Error::TypeMismatch {
            element: self.name.clone(),
            property: name.to_string(),
            expected,
            found: found.ty(),
        }
    }
}
