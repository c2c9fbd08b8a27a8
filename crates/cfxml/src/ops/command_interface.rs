//! `CommandInterface.xml` editing
//!
//! Visibility, placement and ordering of commands, subsystems and groups in
//! a subsystem's (or the configuration's) command interface.

use tracing::{info, warn};

use crate::edit::{Matcher, NewElement, Position, Section};
use crate::error::{Error, Result};
use crate::ops::{expect_root, prefix_in_scope, sibling_name, EditSummary};
use crate::schema::{CommandInterfaceSection, CI_NS, CI_VERSION, XR_NS, XSI_NS, XS_NS};
use crate::xml::{Document, ElementRef, NodeId};

/// One command interface edit
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(tag = "operation", content = "value", rename_all = "kebab-case")
)]
pub enum InterfaceOp {
    Hide(Vec<String>),
    Show(Vec<String>),
    Place { command: String, group: String },
    Order { group: String, commands: Vec<String> },
    SubsystemOrder(Vec<String>),
    GroupOrder(Vec<String>),
}

/// Text of an empty command interface file
pub fn empty_document_source() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n\
         <CommandInterface xmlns=\"{CI_NS}\"\r\n\
         \txmlns:xr=\"{XR_NS}\"\r\n\
         \txmlns:xs=\"{XS_NS}\"\r\n\
         \txmlns:xsi=\"{XSI_NS}\"\r\n\
         \tversion=\"{CI_VERSION}\">\r\n\
         </CommandInterface>"
    )
}

/// Edit session over a loaded `CommandInterface.xml`
#[derive(Debug)]
pub struct CommandInterface<'d> {
    doc: &'d mut Document,
    root: NodeId,
}

impl<'d> CommandInterface<'d> {
    pub fn new(doc: &'d mut Document) -> Result<Self> {
        let root = expect_root(doc, "CommandInterface")?;
        Ok(Self { doc, root })
    }

    pub fn apply(&mut self, op: &InterfaceOp) -> Result<EditSummary> {
        match op {
            InterfaceOp::Hide(commands) => self.set_visibility(commands, false),
            InterfaceOp::Show(commands) => self.set_visibility(commands, true),
            InterfaceOp::Place { command, group } => self.place(command, group),
            InterfaceOp::Order { group, commands } => self.order(group, commands),
            InterfaceOp::SubsystemOrder(paths) => {
                self.replace_list(CommandInterfaceSection::SubsystemsOrder, "Subsystem", paths)
            }
            InterfaceOp::GroupOrder(groups) => {
                self.replace_list(CommandInterfaceSection::GroupsOrder, "Group", groups)
            }
        }
    }

    pub fn hide(&mut self, commands: &[String]) -> Result<EditSummary> {
        self.set_visibility(commands, false)
    }

    pub fn show(&mut self, commands: &[String]) -> Result<EditSummary> {
        self.set_visibility(commands, true)
    }

    fn set_visibility(&mut self, commands: &[String], visible: bool) -> Result<EditSummary> {
        if commands.is_empty() {
            return Err(Error::validation("no commands given"));
        }
        let state = if visible { "true" } else { "false" };
        let label = if visible { "shown" } else { "hidden" };
        let section = self
            .doc
            .find_or_create_section(self.root, CommandInterfaceSection::CommandsVisibility)?;

        let mut summary = EditSummary::default();
        for command in commands {
            let common = self
                .find_command(section, command)
                .and_then(|cmd| self.doc.find_path(cmd, &["Visibility", "Common"]));
            if let Some(common) = common {
                if self.doc.set_scalar_text(common, state)? {
                    summary.modified += 1;
                    info!("Changed to {label}: {command}");
                } else {
                    warn!("Already {label}: {command}");
                }
                continue;
            }

            let xr = prefix_in_scope(self.doc, section, XR_NS, "xr")?;
            let entry = NewElement::new(sibling_name(self.doc, section, "Command")?)
                .attr("name", command.as_str())
                .child(
                    NewElement::new(sibling_name(self.doc, section, "Visibility")?)
                        .child(NewElement::new(format!("{xr}Common")).text(state)),
                );
            self.doc.insert_child(section, entry, Position::AtEnd)?;
            summary.added += 1;
            info!("{}: {command}", capitalize(label));
        }
        Ok(summary)
    }

    /// Put `command` into `group`, updating an existing placement
    pub fn place(&mut self, command: &str, group: &str) -> Result<EditSummary> {
        if command.is_empty() || group.is_empty() {
            return Err(Error::validation("place requires a command and a group"));
        }
        let section = self
            .doc
            .find_or_create_section(self.root, CommandInterfaceSection::CommandsPlacement)?;

        let mut summary = EditSummary::default();
        let existing = self
            .find_command(section, command)
            .and_then(|cmd| self.doc.find_child(cmd, "CommandGroup"));
        if let Some(existing) = existing {
            if self.doc.set_scalar_text(existing, group)? {
                summary.modified += 1;
                info!("Updated placement: {command} -> {group}");
            }
            return Ok(summary);
        }

        let entry = NewElement::new(sibling_name(self.doc, section, "Command")?)
            .attr("name", command)
            .child(NewElement::new(sibling_name(self.doc, section, "CommandGroup")?).text(group))
            .child(NewElement::new(sibling_name(self.doc, section, "Placement")?).text("Auto"));
        self.doc.insert_child(section, entry, Position::AtEnd)?;
        summary.added += 1;
        info!("Placed: {command} -> {group}");
        Ok(summary)
    }

    /// Replace the command order of `group`
    pub fn order(&mut self, group: &str, commands: &[String]) -> Result<EditSummary> {
        if group.is_empty() || commands.is_empty() {
            return Err(Error::validation("order requires a group and its commands"));
        }
        let section = self
            .doc
            .find_or_create_section(self.root, CommandInterfaceSection::CommandsOrder)?;

        let mut summary = EditSummary::default();
        let in_group = |el: ElementRef<'_>| {
            el.local_name() == "Command"
                && el.child("CommandGroup").is_some_and(|g| g.trimmed_text() == group)
        };
        while self.doc.remove_child(section, &in_group)?.is_some() {
            summary.removed += 1;
        }

        for command in commands {
            let entry = NewElement::new(sibling_name(self.doc, section, "Command")?)
                .attr("name", command.as_str())
                .child(
                    NewElement::new(sibling_name(self.doc, section, "CommandGroup")?).text(group),
                );
            self.doc.insert_child(section, entry, Position::AtEnd)?;
            summary.added += 1;
        }
        info!("Set order for {group}: {} commands", commands.len());
        Ok(summary)
    }

    pub fn subsystem_order(&mut self, paths: &[String]) -> Result<EditSummary> {
        self.replace_list(CommandInterfaceSection::SubsystemsOrder, "Subsystem", paths)
    }

    pub fn group_order(&mut self, groups: &[String]) -> Result<EditSummary> {
        self.replace_list(CommandInterfaceSection::GroupsOrder, "Group", groups)
    }

    fn replace_list(
        &mut self,
        section: CommandInterfaceSection,
        local: &str,
        values: &[String],
    ) -> Result<EditSummary> {
        if values.is_empty() {
            return Err(Error::validation(format!(
                "{} requires at least one entry",
                section.local_name()
            )));
        }
        let container = self.doc.find_or_create_section(self.root, section)?;

        let mut summary = EditSummary {
            removed: self.doc.child_elements(container).count(),
            ..EditSummary::default()
        };
        self.doc.clear_children(container)?;
        let name = sibling_name(self.doc, container, local)?;
        for value in values {
            let entry = NewElement::new(name.as_str()).text(value.as_str());
            self.doc.insert_child(container, entry, Position::AtEnd)?;
            summary.added += 1;
        }
        info!("Set {}: {} entries", section.local_name(), values.len());
        Ok(summary)
    }

    fn find_command(&self, section: NodeId, name: &str) -> Option<NodeId> {
        let matcher = Matcher::local("Command").with_attribute("name", name);
        self.doc.find_matching(section, &matcher)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
