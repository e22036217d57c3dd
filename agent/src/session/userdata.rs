use serde::Serialize;
use uuid::Uuid;

/// Name and age the student shared during the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
}

/// A block of text the assistant pinned on the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub id: String,
    pub content: String,
    pub is_showed: bool,
}

/// Mutable per-session state shared by the tool handlers.
#[derive(Debug, Clone, Default)]
pub struct UserData {
    name: String,
    age: Option<u32>,
    components: Vec<Component>,
}

impl UserData {
    pub fn set_user_info(&mut self, name: &str, age: u32) -> UserInfo {
        self.name = name.trim().to_string();
        self.age = Some(age);
        UserInfo {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            age: self.age,
        }
    }

    /// Present once a name has been stored.
    pub fn get_user_info(&self) -> Option<UserInfo> {
        if self.name.is_empty() {
            return None;
        }
        Some(UserInfo {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            age: self.age,
        })
    }

    pub fn add_component(&mut self, content: &str) -> Component {
        let component = Component {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            is_showed: false,
        };
        self.components.push(component.clone());
        component
    }

    pub fn get_component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Flip the visibility flag and return the updated component.
    pub fn toggle_component(&mut self, id: &str) -> Option<Component> {
        let component = self.components.iter_mut().find(|c| c.id == id)?;
        component.is_showed = !component.is_showed;
        Some(component.clone())
    }

    /// Position of the component in creation order.
    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}
