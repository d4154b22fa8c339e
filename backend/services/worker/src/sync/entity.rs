use ledgersync_db::sync::models::EntityType;

/// One step of a full sync. `ALL` is the processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncEntity {
    Customers,
    Vendors,
    Products,
    ChartOfAccounts,
    Invoices,
    Bills,
    JournalEntries,
}

impl SyncEntity {
    pub const ALL: [SyncEntity; 7] = [
        Self::Customers,
        Self::Vendors,
        Self::Products,
        Self::ChartOfAccounts,
        Self::Invoices,
        Self::Bills,
        Self::JournalEntries,
    ];

    /// Name used in logs, results and the coarse-status detail.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Customers => "Customers",
            Self::Vendors => "Vendors",
            Self::Products => "Products",
            Self::ChartOfAccounts => "ChartOfAccounts",
            Self::Invoices => "Invoices",
            Self::Bills => "Bills",
            Self::JournalEntries => "JournalEntries",
        }
    }

    /// Key of the entity-state row this step maintains.
    pub fn state_key(&self) -> EntityType {
        match self {
            Self::Customers => EntityType::Customer,
            Self::Vendors => EntityType::Vendors,
            Self::Products => EntityType::Products,
            Self::ChartOfAccounts => EntityType::ChartOfAccounts,
            Self::Invoices => EntityType::Invoice,
            Self::Bills => EntityType::Bills,
            Self::JournalEntries => EntityType::ManualJournals,
        }
    }

    /// Entity name in the QuickBooks query language.
    pub fn qbo_entity(&self) -> &'static str {
        match self {
            Self::Customers => "Customer",
            Self::Vendors => "Vendor",
            Self::Products => "Item",
            Self::ChartOfAccounts => "Account",
            Self::Invoices => "Invoice",
            Self::Bills => "Bill",
            Self::JournalEntries => "JournalEntry",
        }
    }
}
