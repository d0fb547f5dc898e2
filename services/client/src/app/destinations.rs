//! services/client/src/app/destinations.rs
//!
//! State behind the Destinations page: the list, the create/edit dialog, and
//! its address field.

use ridetribe_core::domain::{Destination, DestinationCategory, DestinationDraft};
use ridetribe_core::ports::{PortError, PortResult, Toast};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::address::{AddressField, AddressValue};
use super::forms::required;
use super::resource_list::{ActionKey, ResourceList};
use super::session::SessionStore;
use super::state::AppState;
use super::viewport::Viewport;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationForm {
    pub name: String,
    pub category: Option<DestinationCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogState {
    pub open: bool,
    /// Id of the destination being edited; `None` when creating.
    pub editing: Option<String>,
}

pub struct DestinationsController {
    state: Arc<AppState>,
    list: ResourceList<Destination>,
    pub address: AddressField,
    form: Mutex<DestinationForm>,
    dialog: Mutex<DialogState>,
}

impl DestinationsController {
    pub fn new(state: Arc<AppState>, session: Arc<SessionStore>) -> Self {
        let api = state.destinations.clone();
        let list = ResourceList::new("destinations", session, state.toaster.clone(), move || {
            let api = api.clone();
            async move { api.list_destinations().await }
        });
        Self {
            address: AddressField::new(state.places.clone()),
            state,
            list,
            form: Mutex::new(DestinationForm::default()),
            dialog: Mutex::new(DialogState::default()),
        }
    }

    pub async fn mount(&self) -> PortResult<()> {
        self.list.load().await
    }

    pub async fn items(&self) -> Vec<Destination> {
        self.list.items().await
    }

    pub fn list(&self) -> &ResourceList<Destination> {
        &self.list
    }

    pub fn form(&self) -> DestinationForm {
        self.form_lock().clone()
    }

    pub fn dialog(&self) -> DialogState {
        self.dialog_lock().clone()
    }

    fn form_lock(&self) -> MutexGuard<'_, DestinationForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dialog_lock(&self) -> MutexGuard<'_, DialogState> {
        self.dialog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn viewport(&self) -> Option<Viewport> {
        Viewport::fit(self.list.items().await.into_iter().filter_map(|d| d.geo))
    }

    //=====================================================================================
    // Dialog
    //=====================================================================================

    pub fn open_create(&self) {
        *self.form_lock() = DestinationForm::default();
        self.address.reset(AddressValue::default());
        *self.dialog_lock() = DialogState {
            open: true,
            editing: None,
        };
    }

    pub async fn open_edit(&self, id: &str) -> PortResult<()> {
        let destination = self
            .list
            .get(id)
            .await
            .ok_or_else(|| PortError::NotFound(format!("Destination {}", id)))?;

        *self.form_lock() = DestinationForm {
            name: destination.name.clone(),
            category: Some(destination.category.unwrap_or_default()),
        };
        self.address.reset(AddressValue {
            text: destination.address.clone(),
            place_id: destination.google_place_id.clone(),
            geo: destination.geo,
        });
        *self.dialog_lock() = DialogState {
            open: true,
            editing: Some(destination.id),
        };
        Ok(())
    }

    pub fn close_dialog(&self) {
        *self.dialog_lock() = DialogState::default();
        *self.form_lock() = DestinationForm::default();
        self.address.reset(AddressValue::default());
    }

    pub fn set_name(&self, name: &str) {
        self.form_lock().name = name.to_string();
    }

    pub fn set_category(&self, category: DestinationCategory) {
        self.form_lock().category = Some(category);
    }

    //=====================================================================================
    // Writes
    //=====================================================================================

    fn draft(&self) -> PortResult<DestinationDraft> {
        let form = self.form();
        let address = self.address.value();
        let name = required(&form.name, "Name")?;
        let text = required(&address.text, "Address")?;
        Ok(DestinationDraft {
            name: name.to_string(),
            address: text.to_string(),
            google_place_id: address.place_id,
            geo: address.geo,
            category: form.category.unwrap_or_default(),
        })
    }

    /// Saves the dialog: creates, or updates the destination being edited.
    pub async fn submit(&self) -> PortResult<Destination> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.state.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };
        let editing = self.dialog().editing;
        let api = self.state.destinations.clone();

        let saved = match editing {
            Some(id) => {
                self.list
                    .refetch(
                        ActionKey::new("save-destination", &id),
                        async { api.update_destination(&id, &draft).await },
                        "Destination updated.",
                    )
                    .await?
            }
            None => {
                self.list
                    .refetch(
                        ActionKey::global("create-destination"),
                        async { api.create_destination(&draft).await },
                        "Destination added.",
                    )
                    .await?
            }
        };
        self.close_dialog();
        Ok(saved)
    }

    /// Returns `Ok(false)` when the user backs out of the confirmation.
    pub async fn delete(&self, id: &str) -> PortResult<bool> {
        if !self
            .state
            .confirmer
            .confirm("Are you sure you want to delete this destination?")
        {
            return Ok(false);
        }
        let api = self.state.destinations.clone();
        self.list
            .refetch(
                ActionKey::new("delete-destination", id),
                async { api.delete_destination(id).await },
                "Destination deleted.",
            )
            .await?;
        Ok(true)
    }
}
