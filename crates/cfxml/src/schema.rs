//! Vocabulary of configuration dump files
//!
//! Namespaces, the closed sets of section and child-object kinds with their
//! canonical order, metadata object types and form purposes.

use std::fmt;
use std::str::FromStr;

use crate::edit::Section;
use crate::error::{Error, Result};

/// Metadata classes (`MetaDataObject` files)
pub const MD_NS: &str = "http://v8.1c.ru/8.3/MDClasses";
/// Core data types (`v8:item`, `v8:lang`, `v8:content`)
pub const V8_NS: &str = "http://v8.1c.ru/8.1/data/core";
/// Readable references (`xr:Item`, `xr:Common`)
pub const XR_NS: &str = "http://v8.1c.ru/8.3/xcf/readable";
/// Command interface files
pub const CI_NS: &str = "http://v8.1c.ru/8.3/xcf/extrnprops";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Format version written into newly created command interface files
pub const CI_VERSION: &str = "2.17";

/// Language used for multilingual values set from the command line
pub const DEFAULT_LANG: &str = "ru";

/// Sections of `CommandInterface.xml`, in schema order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandInterfaceSection {
    CommandsVisibility,
    CommandsPlacement,
    CommandsOrder,
    SubsystemsOrder,
    GroupsOrder,
}

impl Section for CommandInterfaceSection {
    const ORDER: &'static [Self] = &[
        Self::CommandsVisibility,
        Self::CommandsPlacement,
        Self::CommandsOrder,
        Self::SubsystemsOrder,
        Self::GroupsOrder,
    ];

    fn local_name(self) -> &'static str {
        match self {
            Self::CommandsVisibility => "CommandsVisibility",
            Self::CommandsPlacement => "CommandsPlacement",
            Self::CommandsOrder => "CommandsOrder",
            Self::SubsystemsOrder => "SubsystemsOrder",
            Self::GroupsOrder => "GroupsOrder",
        }
    }
}

/// Entries of an object's `ChildObjects`, in schema order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChildObjectKind {
    Resource,
    Dimension,
    Attribute,
    TabularSection,
    AccountingFlag,
    ExtDimensionAccountingFlag,
    EnumValue,
    Column,
    AddressingAttribute,
    Recalculation,
    Form,
    Template,
    Command,
}

impl Section for ChildObjectKind {
    const ORDER: &'static [Self] = &[
        Self::Resource,
        Self::Dimension,
        Self::Attribute,
        Self::TabularSection,
        Self::AccountingFlag,
        Self::ExtDimensionAccountingFlag,
        Self::EnumValue,
        Self::Column,
        Self::AddressingAttribute,
        Self::Recalculation,
        Self::Form,
        Self::Template,
        Self::Command,
    ];

    fn local_name(self) -> &'static str {
        match self {
            Self::Resource => "Resource",
            Self::Dimension => "Dimension",
            Self::Attribute => "Attribute",
            Self::TabularSection => "TabularSection",
            Self::AccountingFlag => "AccountingFlag",
            Self::ExtDimensionAccountingFlag => "ExtDimensionAccountingFlag",
            Self::EnumValue => "EnumValue",
            Self::Column => "Column",
            Self::AddressingAttribute => "AddressingAttribute",
            Self::Recalculation => "Recalculation",
            Self::Form => "Form",
            Self::Template => "Template",
            Self::Command => "Command",
        }
    }
}

impl fmt::Display for ChildObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

impl FromStr for ChildObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ORDER
            .iter()
            .copied()
            .find(|k| k.local_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::validation(format!("unknown child object kind: {s}")))
    }
}

/// Metadata object types that own a `ChildObjects` list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectType {
    Catalog,
    Document,
    Enum,
    Constant,
    DataProcessor,
    Report,
    ExternalDataProcessor,
    ExternalReport,
    InformationRegister,
    AccumulationRegister,
    AccountingRegister,
    CalculationRegister,
    ChartOfAccounts,
    ChartOfCharacteristicTypes,
    ChartOfCalculationTypes,
    ExchangePlan,
    BusinessProcess,
    Task,
    DocumentJournal,
    Subsystem,
}

impl ObjectType {
    pub const ALL: &'static [Self] = &[
        Self::Catalog,
        Self::Document,
        Self::Enum,
        Self::Constant,
        Self::DataProcessor,
        Self::Report,
        Self::ExternalDataProcessor,
        Self::ExternalReport,
        Self::InformationRegister,
        Self::AccumulationRegister,
        Self::AccountingRegister,
        Self::CalculationRegister,
        Self::ChartOfAccounts,
        Self::ChartOfCharacteristicTypes,
        Self::ChartOfCalculationTypes,
        Self::ExchangePlan,
        Self::BusinessProcess,
        Self::Task,
        Self::DocumentJournal,
        Self::Subsystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Document => "Document",
            Self::Enum => "Enum",
            Self::Constant => "Constant",
            Self::DataProcessor => "DataProcessor",
            Self::Report => "Report",
            Self::ExternalDataProcessor => "ExternalDataProcessor",
            Self::ExternalReport => "ExternalReport",
            Self::InformationRegister => "InformationRegister",
            Self::AccumulationRegister => "AccumulationRegister",
            Self::AccountingRegister => "AccountingRegister",
            Self::CalculationRegister => "CalculationRegister",
            Self::ChartOfAccounts => "ChartOfAccounts",
            Self::ChartOfCharacteristicTypes => "ChartOfCharacteristicTypes",
            Self::ChartOfCalculationTypes => "ChartOfCalculationTypes",
            Self::ExchangePlan => "ExchangePlan",
            Self::BusinessProcess => "BusinessProcess",
            Self::Task => "Task",
            Self::DocumentJournal => "DocumentJournal",
            Self::Subsystem => "Subsystem",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Data processors and reports: a single default form, no list or choice forms
    pub fn is_processor_like(self) -> bool {
        matches!(
            self,
            Self::DataProcessor | Self::Report | Self::ExternalDataProcessor | Self::ExternalReport
        )
    }

    /// Child object kinds this type may register
    pub fn allowed_children(self) -> &'static [ChildObjectKind] {
        use ChildObjectKind::*;
        match self {
            Self::Catalog
            | Self::Document
            | Self::ExchangePlan
            | Self::ChartOfAccounts
            | Self::ChartOfCharacteristicTypes
            | Self::ChartOfCalculationTypes
            | Self::BusinessProcess
            | Self::Task
            | Self::Report
            | Self::DataProcessor
            | Self::ExternalDataProcessor
            | Self::ExternalReport => &[Attribute, TabularSection, Form, Template, Command],
            Self::Enum => &[EnumValue, Form, Template, Command],
            Self::InformationRegister
            | Self::AccumulationRegister
            | Self::AccountingRegister
            | Self::CalculationRegister => &[Dimension, Resource, Attribute, Form, Template, Command],
            Self::DocumentJournal => &[Column, Form, Template, Command],
            Self::Constant => &[Form],
            Self::Subsystem => &[],
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a form is registered for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormPurpose {
    #[default]
    Object,
    List,
    Choice,
    Record,
}

impl FormPurpose {
    /// Reject purposes the object type cannot have
    pub fn check(self, object_type: ObjectType) -> Result<()> {
        let allowed = match self {
            Self::Object => true,
            Self::List => object_type != ObjectType::DataProcessor,
            Self::Choice => {
                !object_type.is_processor_like() && object_type != ObjectType::InformationRegister
            }
            Self::Record => object_type == ObjectType::InformationRegister,
        };
        if allowed {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "form purpose {self:?} is not allowed for {object_type}"
            )))
        }
    }

    /// Property in `Properties` naming the default form of this purpose
    pub fn default_property(self, object_type: ObjectType) -> &'static str {
        match self {
            Self::Object if object_type.is_processor_like() => "DefaultForm",
            Self::Object => "DefaultObjectForm",
            Self::List => "DefaultListForm",
            Self::Choice => "DefaultChoiceForm",
            Self::Record => "DefaultRecordForm",
        }
    }
}

impl FromStr for FormPurpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "object" => Ok(Self::Object),
            "list" => Ok(Self::List),
            "choice" => Ok(Self::Choice),
            "record" => Ok(Self::Record),
            _ => Err(Error::validation(format!(
                "invalid form purpose: {s} (expected Object, List, Choice or Record)"
            ))),
        }
    }
}

/// Properties holding `v8:item` language pairs
pub const MULTILINGUAL_PROPERTIES: &[&str] = &[
    "Synonym",
    "BriefInformation",
    "DetailedInformation",
    "Copyright",
    "VendorInformationAddress",
    "ConfigurationInformationAddress",
    "Explanation",
    "ToolTip",
];

pub fn is_multilingual(property: &str) -> bool {
    MULTILINGUAL_PROPERTIES.contains(&property)
}

/// Shape of the entries of a list-valued property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListItem {
    /// Local name in the readable namespace
    pub local: &'static str,
    /// Entries carry `xsi:type="xr:MDObjectRef"`
    pub object_ref: bool,
}

const REF_ITEM: ListItem = ListItem {
    local: "Item",
    object_ref: true,
};

/// Entry shape of a list-valued property, `None` for scalar properties
pub fn list_item(property: &str) -> Option<ListItem> {
    match property {
        "Owners" | "RegisterRecords" | "BasedOn" | "DefaultRoles" | "Content" => Some(REF_ITEM),
        "InputByString" => Some(ListItem {
            local: "Field",
            object_ref: false,
        }),
        _ => None,
    }
}
