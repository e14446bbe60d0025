//! Contract bindings for the Functions router, coordinator, and LINK token.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IFunctionsRouter {
        struct Subscription {
            uint96 balance;
            address owner;
            uint96 blockedBalance;
            address proposedOwner;
            address[] consumers;
            bytes32 flags;
        }

        /// Emitted when a subscription is created.
        #[derive(Debug)]
        event SubscriptionCreated(uint64 indexed subscriptionId, address owner);

        function getSubscription(uint64 subscriptionId) external view returns (Subscription memory);
        function getContractById(bytes32 id) external view returns (address);
        function createSubscription() external returns (uint64 subscriptionId);
        function createSubscriptionWithConsumer(address consumer) external returns (uint64 subscriptionId);
        function cancelSubscription(uint64 subscriptionId, address to) external;
        function addConsumer(uint64 subscriptionId, address consumer) external;
        function removeConsumer(uint64 subscriptionId, address consumer) external;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IFunctionsCoordinator {
        function getDONPublicKey() external view returns (bytes memory);
        function getThresholdPublicKey() external view returns (bytes memory);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface LinkTokenInterface {
        function balanceOf(address owner) external view returns (uint256 balance);
        function transferAndCall(address to, uint256 value, bytes calldata data) external returns (bool success);
    }
}
