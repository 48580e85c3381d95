//! Handlers for the events an installed Admin plugin emits.

use alloy::primitives::Address;
use plugin_common::constants::EXECUTE_PROPOSAL_PERMISSION_ID;
use tracing::warn;

use crate::{
    context::{
        DataSourceContext, Template, DAO_ADDRESS_KEY, PERMISSION_ID_KEY, PLUGIN_ADDRESS_KEY,
    },
    entities::{Action, AdminProposal, Administrator, AdministratorAdminPlugin},
    events::{EventMeta, MembershipContractAnnounced, ProposalCreated, ProposalExecuted},
    ids,
    runtime::Indexer,
};

/// Reacts to a proposal being created on a tracked plugin.
///
/// The DAO address is read from the context the plugin data source was
/// registered with, and the metadata bytes are decoded as UTF-8, lossily.
/// A malformed context makes the event a no-op rather than poisoning the
/// index.
pub fn handle_proposal_created(
    indexer: &mut Indexer,
    context: &DataSourceContext,
    event: &ProposalCreated,
    meta: &EventMeta,
) {
    let Some(dao) = context
        .get_string(DAO_ADDRESS_KEY)
        .and_then(|raw| raw.parse::<Address>().ok())
    else {
        warn!("plugin data source at {} has no usable DAO in its context", meta.address);
        return;
    };

    let metadata = String::from_utf8_lossy(&event.metadata).into_owned();
    record_proposal_created(indexer, dao, &metadata, event, meta);
}

/// Records a created proposal under an explicitly provided DAO and decoded
/// metadata string.
///
/// Writes the proposal row itself, the membership rows for the creator, and
/// one action row per bundled call. The creator is an administrator by
/// construction, so the membership rows are upserted rather than waiting for
/// the corresponding permission event.
pub fn record_proposal_created(
    indexer: &mut Indexer,
    dao: Address,
    metadata: &str,
    event: &ProposalCreated,
    meta: &EventMeta,
) {
    let plugin_address = meta.address;
    let plugin_id = ids::plugin_entity_id(&plugin_address);
    let proposal_id = ids::proposal_entity_id(&plugin_address, event.proposalId);
    let administrator_id = ids::administrator_entity_id(&event.creator);

    let proposal = AdminProposal {
        id: proposal_id.clone(),
        dao_address: dao,
        plugin: plugin_id.clone(),
        plugin_proposal_id: event.proposalId,
        creator: event.creator,
        metadata: metadata.to_owned(),
        executed: false,
        created_at: meta.block_timestamp,
        start_date: event.startDate,
        end_date: event.endDate,
        administrator: administrator_id.clone(),
        allow_failure_map: event.allowFailureMap,
        execution_tx_hash: None,
    };

    let membership_id = ids::administrator_plugin_entity_id(&plugin_address, &event.creator);
    if !indexer.store.contains::<AdministratorAdminPlugin>(&membership_id) {
        indexer.store.set(&AdministratorAdminPlugin {
            id: membership_id,
            administrator: administrator_id.clone(),
            plugin: plugin_id,
        });
    }

    if !indexer.store.contains::<Administrator>(&administrator_id) {
        indexer.store.set(&Administrator {
            id: administrator_id.clone(),
            address: administrator_id,
        });
    }

    // The call id inside action ids is the decimal proposal id
    let call_id = event.proposalId.to_string();
    for (index, action) in event.actions.iter().enumerate() {
        indexer.store.set(&Action {
            id: ids::action_entity_id(&plugin_address, &dao, &call_id, index),
            to: action.to,
            value: action.value,
            data: action.data.clone(),
            dao_address: dao,
            proposal: proposal_id.clone(),
        });
    }

    indexer.store.set(&proposal);
}

/// Flips a tracked proposal to executed and records the executing
/// transaction. Executions of proposals this index never saw are ignored.
pub fn handle_proposal_executed(
    indexer: &mut Indexer,
    event: &ProposalExecuted,
    meta: &EventMeta,
) {
    let proposal_id = ids::proposal_entity_id(&meta.address, event.proposalId);
    let Some(mut proposal) = indexer.store.get::<AdminProposal>(&proposal_id) else {
        return;
    };

    proposal.executed = true;
    proposal.execution_tx_hash = Some(meta.transaction_hash);
    indexer.store.set(&proposal);
}

/// Reacts to a plugin announcing the contract its membership is defined on.
///
/// Spawns a members data source at the announced contract, with the plugin
/// address and the tracked permission id in its context so that permission
/// events there can be screened.
pub fn handle_membership_contract_announced(
    indexer: &mut Indexer,
    event: &MembershipContractAnnounced,
    meta: &EventMeta,
) {
    let mut context = DataSourceContext::new();
    context.set_string(PLUGIN_ADDRESS_KEY, ids::address_id(&meta.address));
    context.set_string(
        PERMISSION_ID_KEY,
        ids::bytes32_id(&EXECUTE_PROPOSAL_PERMISSION_ID),
    );
    indexer.create_data_source(Template::AdminMembers, event.definingContract, context);
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{b256, bytes, Address, Bytes, B256, U256};
    use plugin_common::constants::EXECUTE_PROPOSAL_PERMISSION_ID;

    use super::{
        handle_membership_contract_announced, handle_proposal_created, handle_proposal_executed,
    };
    use crate::{
        context::{DataSourceContext, Template, PERMISSION_ID_KEY, PLUGIN_ADDRESS_KEY},
        entities::{Action, AdminProposal, Administrator, AdministratorAdminPlugin},
        events::{DaoAction, EventMeta, MembershipContractAnnounced, ProposalCreated, ProposalExecuted},
        handlers::fixtures::{indexer, plugin_context, ADMIN_ONE, DAO, PLUGIN},
        ids,
        runtime::Indexer,
    };

    const METADATA: &str = "ipfs://QmaLkXhFtBbzfstN4eLveyvbLGrdNmFFpgJ64CMRoAttat";
    const CREATED_AT: u64 = 1_699_027_200;
    const EXECUTION_TX: B256 =
        b256!("1111111111111111111111111111111111111111111111111111111111111111");

    fn proposal_created(proposal_id: u64, actions: Vec<DaoAction>) -> ProposalCreated {
        ProposalCreated {
            proposalId: U256::from(proposal_id),
            creator: ADMIN_ONE,
            startDate: CREATED_AT,
            endDate: CREATED_AT,
            metadata: Bytes::from(METADATA.as_bytes().to_vec()),
            actions,
            allowFailureMap: U256::ZERO,
        }
    }

    fn sample_action() -> DaoAction {
        DaoAction {
            to: DAO,
            value: U256::ZERO,
            data: bytes!("deadbeef"),
        }
    }

    fn created_meta() -> EventMeta {
        EventMeta::new(PLUGIN, CREATED_AT, B256::ZERO)
    }

    /// Runs the creation handler for a one-action proposal with the given id
    fn create_proposal(indexer: &mut Indexer, proposal_id: u64) {
        let event = proposal_created(proposal_id, vec![sample_action()]);
        handle_proposal_created(indexer, &plugin_context(), &event, &created_meta());
    }

    #[test]
    fn test_proposal_created() {
        let mut indexer = indexer();
        create_proposal(&mut indexer, 1);

        let proposal: AdminProposal = indexer
            .store
            .get(&ids::proposal_entity_id(&PLUGIN, U256::from(1u8)))
            .unwrap();
        assert_eq!(proposal.dao_address, DAO);
        assert_eq!(proposal.plugin, ids::plugin_entity_id(&PLUGIN));
        assert_eq!(proposal.plugin_proposal_id, U256::from(1u8));
        assert_eq!(proposal.creator, ADMIN_ONE);
        assert_eq!(proposal.metadata, METADATA);
        assert!(!proposal.executed);
        assert_eq!(proposal.created_at, CREATED_AT);
        assert_eq!(proposal.start_date, CREATED_AT);
        assert_eq!(proposal.end_date, CREATED_AT);
        assert_eq!(proposal.administrator, ids::administrator_entity_id(&ADMIN_ONE));
        assert_eq!(proposal.allow_failure_map, U256::ZERO);
        assert_eq!(proposal.execution_tx_hash, None);
    }

    #[test]
    fn test_proposal_created_membership_rows() {
        let mut indexer = indexer();
        create_proposal(&mut indexer, 1);

        // The creator shows up as administrator of the plugin right away
        let administrator_id = ids::administrator_entity_id(&ADMIN_ONE);
        let administrator: Administrator = indexer.store.get(&administrator_id).unwrap();
        assert_eq!(administrator.address, administrator_id);

        let membership: AdministratorAdminPlugin = indexer
            .store
            .get(&ids::administrator_plugin_entity_id(&PLUGIN, &ADMIN_ONE))
            .unwrap();
        assert_eq!(membership.administrator, administrator_id);
        assert_eq!(membership.plugin, ids::plugin_entity_id(&PLUGIN));

        // A second proposal by the same creator does not duplicate the rows
        create_proposal(&mut indexer, 2);
        assert_eq!(indexer.store.count::<Administrator>(), 1);
        assert_eq!(indexer.store.count::<AdministratorAdminPlugin>(), 1);
    }

    #[test]
    fn test_proposal_created_actions() {
        let mut indexer = indexer();
        let actions = vec![
            sample_action(),
            DaoAction {
                to: ADMIN_ONE,
                value: U256::from(7u8),
                data: Bytes::new(),
            },
        ];
        let event = proposal_created(255, actions.clone());
        handle_proposal_created(&mut indexer, &plugin_context(), &event, &created_meta());

        assert_eq!(indexer.store.count::<Action>(), 2);
        let proposal_id = ids::proposal_entity_id(&PLUGIN, U256::from(255u64));
        for (index, expected) in actions.iter().enumerate() {
            // Action ids carry the decimal proposal id as call id
            let action_id = ids::action_entity_id(&PLUGIN, &DAO, "255", index);
            let action: Action = indexer.store.get(&action_id).unwrap();
            assert_eq!(action.to, expected.to);
            assert_eq!(action.value, expected.value);
            assert_eq!(action.data, expected.data);
            assert_eq!(action.dao_address, DAO);
            assert_eq!(action.proposal, proposal_id);
        }
    }

    #[test]
    fn test_proposal_created_without_dao_context() {
        let mut indexer = indexer();
        let event = proposal_created(1, vec![sample_action()]);
        handle_proposal_created(&mut indexer, &DataSourceContext::new(), &event, &created_meta());

        assert_eq!(indexer.store.count::<AdminProposal>(), 0);
        assert_eq!(indexer.store.count::<Action>(), 0);
    }

    #[test]
    fn test_proposal_executed() {
        let mut indexer = indexer();
        create_proposal(&mut indexer, 1);

        let event = ProposalExecuted {
            proposalId: U256::from(1u8),
        };
        let meta = EventMeta::new(PLUGIN, CREATED_AT + 5, EXECUTION_TX);
        handle_proposal_executed(&mut indexer, &event, &meta);

        let proposal: AdminProposal = indexer
            .store
            .get(&ids::proposal_entity_id(&PLUGIN, U256::from(1u8)))
            .unwrap();
        assert!(proposal.executed);
        assert_eq!(proposal.execution_tx_hash, Some(EXECUTION_TX));
        // Creation-time fields survive the update
        assert_eq!(proposal.metadata, METADATA);
        assert_eq!(proposal.created_at, CREATED_AT);
    }

    #[test]
    fn test_proposal_executed_untracked_proposal() {
        let mut indexer = indexer();
        let event = ProposalExecuted {
            proposalId: U256::from(9u8),
        };
        handle_proposal_executed(&mut indexer, &event, &EventMeta::mock(PLUGIN));

        assert_eq!(indexer.store.count::<AdminProposal>(), 0);
    }

    #[test]
    fn test_membership_contract_announced() {
        let mut indexer = indexer();
        let event = MembershipContractAnnounced {
            definingContract: DAO,
        };
        handle_membership_contract_announced(&mut indexer, &event, &EventMeta::mock(PLUGIN));

        assert_eq!(indexer.data_source_count(Template::AdminMembers), 1);
        assert!(indexer.data_source_exists(Template::AdminMembers, DAO));
        let context = indexer.context_of(Template::AdminMembers, DAO).unwrap();
        assert_eq!(
            context.get_string(PLUGIN_ADDRESS_KEY),
            Some(ids::address_id(&PLUGIN).as_str())
        );
        assert_eq!(
            context.get_string(PERMISSION_ID_KEY),
            Some(ids::bytes32_id(&EXECUTE_PROPOSAL_PERMISSION_ID).as_str())
        );
    }

    #[test]
    fn test_membership_announced_for_two_plugins() {
        let mut indexer = indexer();
        let second_plugin = Address::from_slice(&[0xb2; 20]);

        let event = MembershipContractAnnounced {
            definingContract: DAO,
        };
        handle_membership_contract_announced(&mut indexer, &event, &EventMeta::mock(PLUGIN));
        handle_membership_contract_announced(&mut indexer, &event, &EventMeta::mock(second_plugin));

        // The DAO hosts both plugins' permissions; the first registration wins
        assert_eq!(indexer.data_source_count(Template::AdminMembers), 1);
        let context = indexer.context_of(Template::AdminMembers, DAO).unwrap();
        assert_eq!(
            context.get_string(PLUGIN_ADDRESS_KEY),
            Some(ids::address_id(&PLUGIN).as_str())
        );
    }
}
