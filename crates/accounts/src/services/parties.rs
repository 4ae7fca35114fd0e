//! Customer addresses (parties).
//!
//! Operations on the current visitor's addresses first resolve the visitor
//! to a principal. If that fails, the lookup's messages are copied into a
//! failed result and no party call is made.

use storefront_accounts_core::{
    CommerceCustomer, ManagerResponse, Party, PartyId, ServiceResult, SystemMessage,
};

use super::AccountManager;
use crate::context::VisitorContext;
use crate::messages::{MessageKey, log_system_messages};
use crate::provider::{
    AddPartiesResult, CustomerResult, GetPartiesRequest, GetPartiesResult, PartiesRequest,
};

impl AccountManager {
    /// List a customer's parties.
    ///
    /// The projected list is empty, never absent, when the call fails or the
    /// backend returns no parties.
    #[must_use]
    pub fn parties(
        &self,
        customer: &CommerceCustomer,
    ) -> ManagerResponse<GetPartiesResult, Vec<Party>> {
        let request = GetPartiesRequest {
            customer: customer.clone(),
        };

        let result = self
            .provider
            .get_parties(&request)
            .unwrap_or_else(|e| e.into_result());

        let parties = if result.success {
            result.payload.clone().unwrap_or_default()
        } else {
            Vec::new()
        };

        log_system_messages("parties", &result.messages);
        ManagerResponse::new(result, parties)
    }

    /// List the current visitor's parties.
    #[must_use]
    pub fn current_customer_parties(
        &self,
        visitor: &dyn VisitorContext,
    ) -> ManagerResponse<GetPartiesResult, Vec<Party>> {
        match self.resolve_customer(visitor) {
            Ok(customer) => self.parties(&customer),
            Err(messages) => ManagerResponse::new(ServiceResult::failed_with(messages), Vec::new()),
        }
    }

    /// Add an address to the current visitor.
    #[must_use]
    pub fn add_address(
        &self,
        visitor: &dyn VisitorContext,
        address: Party,
    ) -> ManagerResponse<AddPartiesResult, bool> {
        let customer = match self.resolve_customer(visitor) {
            Ok(customer) => customer,
            Err(messages) => {
                return ManagerResponse::from_success(ServiceResult::failed_with(messages));
            }
        };

        let request = PartiesRequest::new(customer, vec![address]);
        let result = self
            .provider
            .add_parties(&request)
            .unwrap_or_else(|e| e.into_result());
        let result = self.explain_failure(result, MessageKey::AddAddressError);

        log_system_messages("add_address", &result.messages);
        ManagerResponse::from_success(result)
    }

    /// Update one of the current visitor's addresses.
    #[must_use]
    pub fn update_address(
        &self,
        visitor: &dyn VisitorContext,
        address: Party,
    ) -> ManagerResponse<CustomerResult, bool> {
        let customer = match self.resolve_customer(visitor) {
            Ok(customer) => customer,
            Err(messages) => {
                return ManagerResponse::from_success(ServiceResult::failed_with(messages));
            }
        };

        let request = PartiesRequest::new(customer, vec![address]);
        let result = self
            .provider
            .update_parties(&request)
            .unwrap_or_else(|e| e.into_result());
        let result = self.explain_failure(result, MessageKey::UpdateAddressError);

        if !result.success {
            log_system_messages("update_address", &result.messages);
        }
        ManagerResponse::from_success(result)
    }

    /// Delete one of the current visitor's addresses by ID.
    #[must_use]
    pub fn delete_address(
        &self,
        visitor: &dyn VisitorContext,
        address_id: &PartyId,
    ) -> ManagerResponse<CustomerResult, bool> {
        match self.resolve_customer(visitor) {
            Ok(customer) => {
                self.remove_parties(&customer, vec![Party::reference(address_id.clone())])
            }
            Err(messages) => ManagerResponse::from_success(ServiceResult::failed_with(messages)),
        }
    }

    /// Remove parties from a customer.
    #[must_use]
    pub fn remove_parties(
        &self,
        customer: &CommerceCustomer,
        parties: Vec<Party>,
    ) -> ManagerResponse<CustomerResult, bool> {
        let request = PartiesRequest::new(customer.clone(), parties);
        let result = self
            .provider
            .remove_parties(&request)
            .unwrap_or_else(|e| e.into_result());
        let result = self.explain_failure(result, MessageKey::RemoveAddressError);

        if !result.success {
            log_system_messages("remove_parties", &result.messages);
        }
        ManagerResponse::from_success(result)
    }

    /// Resolve the visitor to a correlation-only customer, or the lookup's
    /// messages.
    fn resolve_customer(
        &self,
        visitor: &dyn VisitorContext,
    ) -> Result<CommerceCustomer, Vec<SystemMessage>> {
        let lookup = self.get_user(&visitor.user_name());
        match lookup.result {
            Some(user) if lookup.service_result.success => Ok(user.as_customer()),
            _ => {
                log_system_messages("customer_lookup", &lookup.service_result.messages);
                Err(lookup.service_result.messages)
            }
        }
    }
}
