//! # Command Line
//!
//! clap derive definitions for every `khatha` subcommand.
//!
//! ```text
//! khatha [--config PATH] [--json] <command>
//!
//!   login send-otp | verify            retailer login
//!   customer send-otp | verify | ...   customer login and shop accounts
//!   cart add | set | customer | mode   build the counter sale
//!   bill                               save it
//!   bills list | show | edit           every bill, CSV export
//!   customers | products | orders      shop records
//!   shop browse | add | checkout       marketplace (customer mode)
//!   suppliers | staff | dashboard      back office
//!   profile | config                   settings
//! ```

use std::convert::Infallible;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use khatha_client::AppMode;
use khatha_core::ledger::BillSort;
use khatha_core::validation::{parse_amount, parse_quantity};
use khatha_core::{
    AttendanceStatus, BillStatus, Money, OrderPaymentMode, OrderStatus, PaymentMode, ProductType,
    SupplierTransactionType,
};

/// Khatha Wallet: counter billing, customer khatha and marketplace orders
#[derive(Parser, Debug)]
#[command(name = "khatha")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "KHATHA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print replies and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    // === Session ===
    /// Retailer login by email OTP
    #[command(subcommand)]
    Login(LoginCommand),

    /// Register a new shop
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },

    /// Customer login and shop accounts
    #[command(subcommand)]
    Customer(CustomerAuthCommand),

    /// Switch between retailer and customer mode
    Mode { mode: AppMode },

    Logout,

    /// Show who is logged in
    Whoami,

    // === Counter ===
    /// Build the counter sale
    #[command(subcommand)]
    Cart(CartCommand),

    /// Save the counter sale as a bill
    Bill(BillArgs),

    // === Records ===
    /// Every bill of the shop
    #[command(subcommand)]
    Bills(BillsCommand),

    /// Customers and their khatha
    #[command(subcommand)]
    Customers(CustomersCommand),

    /// Product catalogue
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Online orders received by the shop
    #[command(subcommand)]
    Orders(OrdersCommand),

    /// Marketplace (customer mode)
    #[command(subcommand)]
    Shop(ShopCommand),

    #[command(subcommand)]
    Suppliers(SuppliersCommand),

    #[command(subcommand)]
    Staff(StaffCommand),

    /// Today's sales, dues and low stock
    Dashboard,

    // === Settings ===
    /// Shop profile (name, UPI id)
    #[command(subcommand)]
    Profile(ProfileCommand),

    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum LoginCommand {
    /// Email a login code
    SendOtp { email: String },

    /// Log in with the emailed code
    Verify { email: String, otp: String },
}

#[derive(Subcommand, Debug)]
pub enum CustomerAuthCommand {
    /// Email a login code
    SendOtp { email: String },

    /// Log in with the emailed code (registers new customers)
    Verify {
        email: String,
        otp: String,
        /// Shop to register with when the email is new
        #[arg(long)]
        shop: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Log in with a phone number
    Login {
        #[arg(long)]
        phone: String,
    },

    /// List the shops this customer has an account with
    Shops,

    /// Use the account at another shop
    Select { shop: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// Add one unit by barcode (or --id)
    Add {
        #[arg(required_unless_present = "id")]
        barcode: Option<String>,
        #[arg(long, conflicts_with = "barcode")]
        id: Option<i64>,
    },

    /// Take one unit off a line
    Dec { id: i64 },

    /// Set a line's quantity (0 removes it)
    Set {
        id: i64,
        #[arg(value_parser = quantity_arg, allow_hyphen_values = true)]
        qty: u32,
    },

    Remove { id: i64 },

    Show,

    Clear,

    /// Attach a customer (or --none to detach)
    Customer {
        #[arg(required_unless_present = "none")]
        id: Option<i64>,
        #[arg(long)]
        none: bool,
    },

    /// Loyalty points to redeem
    Redeem {
        #[arg(value_parser = amount_arg, allow_hyphen_values = true)]
        points: Money,
    },

    /// Amount paid now on a khatha bill
    Paid {
        #[arg(value_parser = amount_arg, allow_hyphen_values = true)]
        amount: Money,
    },

    /// CASH, UPI or KHATHA
    Mode { mode: PaymentMode },
}

/// Counter quantities never fail to parse; junk and negatives become 0.
fn quantity_arg(raw: &str) -> Result<u32, Infallible> {
    Ok(parse_quantity(raw))
}

fn amount_arg(raw: &str) -> Result<Money, Infallible> {
    Ok(parse_amount(raw))
}

#[derive(Args, Debug)]
pub struct BillArgs {
    /// Create this customer and attach them before saving
    #[arg(long, requires = "new_customer_phone")]
    pub new_customer_name: Option<String>,

    #[arg(long, requires = "new_customer_name")]
    pub new_customer_phone: Option<String>,

    /// Skip the UPI confirmation prompt
    #[arg(long)]
    pub upi_received: bool,
}

#[derive(Subcommand, Debug)]
pub enum BillsCommand {
    /// Newest first
    List {
        /// Bill number, customer name or status
        #[arg(long)]
        search: Option<String>,
        /// Also write the listed bills to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Receipt for one bill
    Show { id: i64 },

    /// Correct a bill; omitted fields keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        amount: Option<Money>,
        #[arg(long)]
        paid: Option<Money>,
        #[arg(long)]
        status: Option<BillStatus>,
        #[arg(long)]
        mode: Option<PaymentMode>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomersCommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },

    Add {
        name: String,
        phone: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// Bills, statement and scheme progress
    Show {
        id: i64,
        #[arg(long, default_value = "newest")]
        sort: BillSort,
    },

    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },

    Email { id: i64, email: String },

    /// Write a manual khatha entry
    Entry(EntryArgs),

    /// Enrol in the monthly savings scheme
    Scheme {
        id: i64,
        #[arg(long, default_value = "500")]
        monthly: Money,
        #[arg(long, default_value = "6000")]
        target: Money,
    },

    /// Correct a saved bill
    EditBill {
        bill: i64,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        paid: Money,
        #[arg(long)]
        status: BillStatus,
        #[arg(long, default_value = "KHATHA")]
        mode: PaymentMode,
    },

    /// Send a loyalty-points reminder
    Notify { id: i64 },

    /// Record a payment against the due
    Pay {
        id: i64,
        amount: Money,
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// All recorded payments
    Payments,
}

#[derive(Args, Debug)]
pub struct EntryArgs {
    pub customer: i64,

    pub kind: EntryKind,

    pub amount: Money,

    /// Items text (gave) or note / mode (received, scheme)
    #[arg(long)]
    pub note: Option<String>,

    /// Bill date; the backend uses today when omitted
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Photo of the paper bill
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Goods given on credit
    Gave,
    /// Money received
    Received,
    /// Savings scheme deposit
    Scheme,
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        /// Only products at or below the low-stock mark
        #[arg(long)]
        low_stock: bool,
    },

    Add(ProductArgs),

    Update {
        id: i64,
        #[command(flatten)]
        changes: ProductChanges,
    },

    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },

    /// Look a barcode up in the UPC database
    Lookup { barcode: String },
}

#[derive(Args, Debug)]
pub struct ProductArgs {
    pub barcode: String,

    /// Taken from the UPC lookup when omitted
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub price: Money,

    #[arg(long, default_value_t = 0)]
    pub qty: i64,

    #[arg(long, value_enum, default_value = "unit")]
    pub kind: ProductKind,

    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ProductChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<Money>,
    #[arg(long)]
    pub qty: Option<i64>,
    #[arg(long, value_enum)]
    pub kind: Option<ProductKind>,
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductKind {
    Unit,
    Weight,
    Liquid,
}

impl From<ProductKind> for ProductType {
    fn from(kind: ProductKind) -> Self {
        match kind {
            ProductKind::Unit => ProductType::Unit,
            ProductKind::Weight => ProductType::Weight,
            ProductKind::Liquid => ProductType::Liquid,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    List,

    /// Move an order along; DELIVERED needs the customer's OTP
    Status {
        id: i64,
        status: OrderStatus,
        #[arg(long)]
        otp: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ShopCommand {
    /// Products from every shop
    Browse {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },

    /// Put a product in the marketplace cart
    Add { product: i64 },

    Remove { product: i64 },

    Cart,

    /// Place one order per shop
    Checkout {
        #[arg(long, default_value = "COD")]
        pay: OrderPaymentMode,
        #[arg(long)]
        yes: bool,
    },

    Nearby {
        lat: f64,
        lng: f64,
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Every shop on the marketplace
    Shops,

    /// My orders
    Orders,

    /// Cancel a pending order
    Cancel { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum SuppliersCommand {
    List,

    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },

    Update {
        id: i64,
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },

    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },

    /// Transaction history
    Txns { id: i64 },

    /// Record a supplier bill or a payment to them
    Transact {
        id: i64,
        kind: SupplierKind,
        amount: Money,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupplierKind {
    Bill,
    Payment,
}

impl From<SupplierKind> for SupplierTransactionType {
    fn from(kind: SupplierKind) -> Self {
        match kind {
            SupplierKind::Bill => SupplierTransactionType::Bill,
            SupplierKind::Payment => SupplierTransactionType::Payment,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
    List,

    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        salary: Option<Money>,
    },

    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },

    /// Today's attendance sheet
    Today,

    Mark {
        id: i64,
        status: AttendanceStatus,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    History { id: i64 },

    /// One month's attendance with totals
    Monthly {
        id: i64,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,

    Set {
        #[arg(long)]
        shop_name: Option<String>,
        #[arg(long)]
        upi: Option<String>,
        #[arg(long)]
        payee: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,

    Set { key: ConfigKey, value: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    ApiUrl,
    Timeout,
    Gst,
    QuickMode,
    Retries,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_money_and_modes() {
        let cli = Cli::try_parse_from(["khatha", "cart", "paid", "150.50"]).unwrap();
        match cli.command {
            Command::Cart(CartCommand::Paid { amount }) => assert_eq!(amount, Money::from_paise(15050)),
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["khatha", "--json", "cart", "mode", "khatha"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Cart(CartCommand::Mode { mode: PaymentMode::Khatha })));
    }

    #[test]
    fn test_entry_args() {
        let cli = Cli::try_parse_from([
            "khatha", "customers", "entry", "12", "received", "200", "--note", "GPay", "--date", "2024-05-01",
        ])
        .unwrap();
        let Command::Customers(CustomersCommand::Entry(args)) = cli.command else {
            panic!("not an entry");
        };
        assert_eq!(args.customer, 12);
        assert_eq!(args.kind, EntryKind::Received);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_bad_counter_numbers_clamp_to_zero() {
        let cli = Cli::try_parse_from(["khatha", "cart", "set", "3", "-2"]).unwrap();
        assert!(matches!(cli.command, Command::Cart(CartCommand::Set { id: 3, qty: 0 })));

        let cli = Cli::try_parse_from(["khatha", "cart", "set", "3", "two"]).unwrap();
        assert!(matches!(cli.command, Command::Cart(CartCommand::Set { qty: 0, .. })));

        let cli = Cli::try_parse_from(["khatha", "cart", "paid", "abc"]).unwrap();
        match cli.command {
            Command::Cart(CartCommand::Paid { amount }) => assert_eq!(amount, Money::zero()),
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["khatha", "cart", "redeem", "-5"]).unwrap();
        match cli.command {
            Command::Cart(CartCommand::Redeem { points }) => assert_eq!(points, Money::zero()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bills_list_flags() {
        let cli = Cli::try_parse_from(["khatha", "bills", "list", "--search", "ramesh", "--export", "out.csv"]).unwrap();
        let Command::Bills(BillsCommand::List { search, export }) = cli.command else {
            panic!("not a bills list");
        };
        assert_eq!(search.as_deref(), Some("ramesh"));
        assert_eq!(export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_cart_add_needs_barcode_or_id() {
        assert!(Cli::try_parse_from(["khatha", "cart", "add"]).is_err());
        assert!(Cli::try_parse_from(["khatha", "cart", "add", "--id", "4"]).is_ok());
    }
}
