//! Output container
//!
//! The export is assembled in memory as a tree of named groups holding typed n-dimensional datasets,
//! and persisted in a single call once every section has been written. Members keep their insertion
//! order so the file is laid out in the order the sections were produced.
//!
//! ```ignore
//! let mut container = Container::default();
//! container.write_scalar("DIM", 2_u32)?;
//! let hamiltonian = container.create_group("Hamiltonian")?;
//! hamiltonian.write_array("NHoppings", Array1::from(vec![3_u32, 3]))?;
//! container.write("config.h5")?;
//! ```

mod persist;

pub use persist::FILE_EXTENSION;

use crate::error::ContainerError;
use ndarray::{arr0, Array, ArrayD, Dimension};
use num_complex::{Complex32, Complex64};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// The typed payload of a dataset
pub enum Data {
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    C32(ArrayD<Complex32>),
    C64(ArrayD<Complex64>),
}

impl Data {
    pub fn shape(&self) -> &[usize] {
        match self {
            Data::U32(x) => x.shape(),
            Data::I32(x) => x.shape(),
            Data::I64(x) => x.shape(),
            Data::F32(x) => x.shape(),
            Data::F64(x) => x.shape(),
            Data::C32(x) => x.shape(),
            Data::C64(x) => x.shape(),
        }
    }

    pub fn as_u32(&self) -> Option<&ArrayD<u32>> {
        match self {
            Data::U32(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&ArrayD<i32>> {
        match self {
            Data::I32(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            Data::I64(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Data::F32(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&ArrayD<f64>> {
        match self {
            Data::F64(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_c32(&self) -> Option<&ArrayD<Complex32>> {
        match self {
            Data::C32(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_c64(&self) -> Option<&ArrayD<Complex64>> {
        match self {
            Data::C64(x) => Some(x),
            _ => None,
        }
    }
}

/// Element types which can be stored in a dataset
pub trait Element: Clone {
    fn wrap(array: ArrayD<Self>) -> Data;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            fn wrap(array: ArrayD<Self>) -> Data {
                Data::$variant(array)
            }
        }
    };
}

impl_element!(u32, U32);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(f32, F32);
impl_element!(f64, F64);
impl_element!(Complex32, C32);
impl_element!(Complex64, C64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    data: Data,
}

impl Dataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Data {
        &self.data
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
}

impl Node {
    fn name(&self) -> &str {
        match self {
            Node::Group(group) => &group.name,
            Node::Dataset(dataset) => &dataset.name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// A named collection of groups and datasets
pub struct Group {
    name: String,
    members: Vec<Node>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Node] {
        &self.members
    }

    /// Names of the direct members, in insertion order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(Node::name).collect()
    }

    fn check_vacant(&self, name: &str) -> Result<(), ContainerError> {
        if self.members.iter().any(|member| member.name() == name) {
            return Err(ContainerError::Duplicate(format!("{}/{}", self.name, name)));
        }
        Ok(())
    }

    /// Create an empty subgroup and return a handle to it
    pub fn create_group(&mut self, name: &str) -> Result<&mut Group, ContainerError> {
        self.check_vacant(name)?;
        self.members.push(Node::Group(Group::new(name)));
        match self.members.last_mut() {
            Some(Node::Group(group)) => Ok(group),
            _ => Err(ContainerError::Missing(name.to_string())),
        }
    }

    /// Write an n-dimensional dataset
    pub fn write_array<T: Element, D: Dimension>(
        &mut self,
        name: &str,
        array: Array<T, D>,
    ) -> Result<(), ContainerError> {
        self.check_vacant(name)?;
        tracing::trace!("Writing dataset {}/{}", self.name, name);
        self.members.push(Node::Dataset(Dataset {
            name: name.to_string(),
            data: T::wrap(array.into_dyn()),
        }));
        Ok(())
    }

    /// Write a zero-dimensional dataset
    pub fn write_scalar<T: Element>(&mut self, name: &str, value: T) -> Result<(), ContainerError> {
        self.write_array(name, arr0(value))
    }

    /// Look up a group by a `/` separated path relative to this group
    pub fn group(&self, path: &str) -> Option<&Group> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |group, segment| {
                group.members.iter().find_map(|member| match member {
                    Node::Group(child) if child.name == segment => Some(child),
                    _ => None,
                })
            })
    }

    /// Look up the payload of a dataset by a `/` separated path relative to this group
    pub fn dataset(&self, path: &str) -> Option<&Data> {
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (self.group(parent)?, name),
            None => (self, path),
        };
        parent.members.iter().find_map(|member| match member {
            Node::Dataset(dataset) if dataset.name == name => Some(&dataset.data),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// The root of an output file
pub struct Container {
    root: Group,
}

impl Deref for Container {
    type Target = Group;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}

impl DerefMut for Container {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.root
    }
}

#[cfg(test)]
mod test {
    use super::{Container, Data};
    use crate::error::ContainerError;
    use ndarray::{array, Array2};

    #[test]
    fn members_keep_insertion_order() {
        let mut container = Container::default();
        container.write_scalar("IS_COMPLEX", 0_u32).unwrap();
        container.write_scalar("PRECISION", 1_u32).unwrap();
        container.create_group("Hamiltonian").unwrap();
        container.write_scalar("DIM", 2_u32).unwrap();
        assert_eq!(
            container.member_names(),
            vec!["IS_COMPLEX", "PRECISION", "Hamiltonian", "DIM"]
        );
    }

    #[test]
    fn nested_paths_resolve_to_datasets() {
        let mut container = Container::default();
        let hamiltonian = container.create_group("Hamiltonian").unwrap();
        hamiltonian
            .write_array("NHoppings", array![1_u32, 1])
            .unwrap();
        let disorder = hamiltonian.create_group("Disorder").unwrap();
        disorder
            .write_array("OnsiteDisorderMeanValue", Array2::<f64>::zeros((1, 0)))
            .unwrap();

        let hoppings = container.dataset("Hamiltonian/NHoppings").unwrap();
        assert_eq!(hoppings.as_u32().unwrap().as_slice().unwrap(), &[1, 1]);
        assert_eq!(
            container
                .dataset("Hamiltonian/Disorder/OnsiteDisorderMeanValue")
                .map(Data::shape),
            Some(&[1_usize, 0][..])
        );
        assert!(container.dataset("Hamiltonian/Missing").is_none());
        assert!(container.group("Calculation").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut container = Container::default();
        container.create_group("Calculation").unwrap();
        assert!(matches!(
            container.write_scalar("Calculation", 1_i32),
            Err(ContainerError::Duplicate(_))
        ));
    }
}
