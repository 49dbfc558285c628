// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").action(ArgAction::SetTrue))
        .arg(
            arg!(--jsonl "Print one JSON object per line")
                .action(ArgAction::SetTrue)
                .conflicts_with("json"),
        )
}

fn posting_args(cmd: Command) -> Command {
    cmd.arg(arg!(--account <ACCOUNT_ID> "Account id").required(true))
        .arg(arg!(--amount <AMOUNT> "Positive amount").required(true))
        .arg(arg!(--date <DATE> "YYYY-MM-DD (default today)"))
        .arg(arg!(--currency <CCY> "Currency (default: account currency)"))
        .arg(arg!(--category <CATEGORY>))
        .arg(arg!(--note <NOTE>))
}

fn as_of(cmd: Command) -> Command {
    cmd.arg(arg!(--date <DATE> "As-of date YYYY-MM-DD (default today)"))
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .about("Billfold: per-user flat-file bookkeeping")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("BILLFOLD_USER")
                .default_value("guest")
                .help("User whose books to open"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .env("BILLFOLD_HOME")
                .help("Root directory holding users/<name>/"),
        )
        .subcommand(Command::new("init").about("Create the user's files and seed categories"))
        .subcommand(
            Command::new("account")
                .about("Accounts")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--id <ACCOUNT_ID> "External account id").required(true))
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(
                            arg!(--"type" <TYPE> "Current, Savings, Credit Card, Investment, Other, Loan, Overdraft")
                                .required(true),
                        )
                        .arg(arg!(--balance <AMOUNT> "Opening balance"))
                        .arg(arg!(--currency <CCY>).default_value("GBP"))
                        .arg(arg!(--limit <AMOUNT>))
                        .arg(arg!(--apr <PCT>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("category")
                .about("Income and expense categories")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--kind <KIND> "Income or Expense").required(true))
                        .arg(arg!(--name <NAME>).required(true)),
                )
                .subcommand(Command::new("list").arg(arg!(--kind <KIND>)))
                .subcommand(Command::new("seed").about("Add the default categories to an empty list")),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(posting_args(Command::new("income")))
                .subcommand(posting_args(Command::new("expense")))
                .subcommand(
                    Command::new("transfer")
                        .arg(arg!(--from <ACCOUNT_ID>).required(true))
                        .arg(arg!(--to <ACCOUNT_ID>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--date <DATE>))
                        .arg(arg!(--currency <CCY>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(arg!(--month <YYYY_MM>))
                        .arg(arg!(--account <ACCOUNT_ID>))
                        .arg(arg!(--category <CATEGORY>))
                        .arg(arg!(--uncategorised "Only rows without a category").action(ArgAction::SetTrue))
                        .arg(arg!(--limit <N>).value_parser(value_parser!(usize))),
                )),
        )
        .subcommand(
            Command::new("interest")
                .about("Monthly interest accrual")
                .subcommand(as_of(Command::new("cards").about("Charge interest on credit cards")))
                .subcommand(as_of(Command::new("loans").about("Charge interest on non-card debts"))),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring incomes and expenses")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--kind <KIND> "income or expense").required(true))
                        .arg(arg!(--label <LABEL> "Category-like label").required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(
                            arg!(--frequency <FREQ> "Daily, Weekly, Bi-Weekly, Monthly, Bi-Monthly, Quarterly, Yearly")
                                .required(true),
                        )
                        .arg(arg!(--next <DATE> "Next due date").required(true))
                        .arg(arg!(--account <ACCOUNT_ID>).required(true))
                        .arg(arg!(--currency <CCY>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(json_flags(Command::new("list").arg(arg!(--kind <KIND>))))
                .subcommand(as_of(Command::new("run").about("Post everything due"))),
        )
        .subcommand(
            Command::new("debt")
                .about("Loans, overdrafts and other debts")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--lender <LENDER>).required(true))
                        .arg(arg!(--"type" <TYPE> "loan, overdraft, other, credit card").default_value("loan"))
                        .arg(arg!(--account <ACCOUNT_ID> "Linked account"))
                        .arg(arg!(--amount <AMOUNT> "Original amount").required(true))
                        .arg(arg!(--currency <CCY>).default_value("GBP"))
                        .arg(arg!(--apr <PCT>))
                        .arg(arg!(--"min-payment" <AMOUNT>))
                        .arg(arg!(--"payment-day" <DAY>).value_parser(value_parser!(u32)))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(json_flags(as_of(Command::new("list"))))
                .subcommand(
                    Command::new("pay")
                        .arg(arg!(--id <DEBT_ID>).required(true))
                        .arg(arg!(--from <ACCOUNT_ID>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--date <DATE>))
                        .arg(arg!(--currency <CCY>))
                        .arg(arg!(--note <NOTE>)),
                ),
        )
        .subcommand(
            Command::new("card")
                .about("Credit-card statements")
                .subcommand(
                    Command::new("close")
                        .arg(arg!(--card <ACCOUNT_ID>).required(true))
                        .arg(arg!(--"period-end" <DATE> "Defaults to the last cc_statement_day on or before --date"))
                        .arg(arg!(--"period-start" <DATE>))
                        .arg(arg!(--date <DATE> "Reference date, defaults to today"))
                        .arg(arg!(--"due-days" <DAYS>).value_parser(value_parser!(i64)))
                        .arg(arg!(--"min-pct" <PCT>))
                        .arg(arg!(--"min-floor" <AMOUNT>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(
                    Command::new("pay")
                        .arg(arg!(--card <ACCOUNT_ID> "Pay the card's latest statement"))
                        .arg(arg!(--statement <ID>).conflicts_with("card"))
                        .arg(arg!(--from <ACCOUNT_ID>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--date <DATE>))
                        .arg(arg!(--currency <CCY>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(json_flags(Command::new("statements").arg(arg!(--card <ACCOUNT_ID>)))),
        )
        .subcommand(
            Command::new("rules")
                .about("Categorisation rules")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--contains <TEXT>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true))
                        .arg(arg!(--field <FIELD> "note, category or account_id").default_value("note"))
                        .arg(arg!(--kind <KIND> "Also set the transaction kind"))
                        .arg(arg!(--priority <N>).value_parser(value_parser!(i64)).default_value("1000"))
                        .arg(arg!(--"case-sensitive").action(ArgAction::SetTrue)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true)))
                .subcommand(Command::new("apply").arg(arg!(--"dry-run").action(ArgAction::SetTrue))),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--month <YYYY_MM>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--currency <CCY>))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(Command::new("list").arg(arg!(--month <YYYY_MM>)))
                .subcommand(json_flags(
                    Command::new("report").arg(arg!(--month <YYYY_MM>).required(true)),
                )),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .arg(arg!(--path <CSV>).required(true))
                    .arg(arg!(--account <ACCOUNT_ID>).required(true))
                    .arg(arg!(--"date-col" <COL>).default_value("date"))
                    .arg(arg!(--"amount-col" <COL>))
                    .arg(arg!(--"debit-col" <COL>))
                    .arg(arg!(--"credit-col" <COL>))
                    .arg(arg!(--"desc-col" <COL>))
                    .arg(arg!(--currency <CCY>))
                    .arg(arg!(--invert "Flip the sign of the amount column").action(ArgAction::SetTrue))
                    .arg(arg!(--"apply-rules" "Categorise afterwards").action(ArgAction::SetTrue))
                    .arg(arg!(--"dry-run").action(ArgAction::SetTrue)),
            ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(arg!(--format <FMT> "csv or json").default_value("csv"))
                    .arg(arg!(--out <PATH>).required(true))
                    .arg(arg!(--from <DATE>))
                    .arg(arg!(--to <DATE>))
                    .arg(arg!(--account <ACCOUNT_ID>).action(ArgAction::Append)),
            ),
        )
        .subcommand(json_flags(as_of(
            Command::new("due")
                .about("Recurring items and statements due soon")
                .arg(arg!(--days <N>).value_parser(value_parser!(i64)).default_value("14")),
        )))
        .subcommand(
            Command::new("doctor")
                .about("Consistency checks")
                .arg(arg!(--fix "Assign ids to rows that have none").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("prefs")
                .about("Preferences")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(arg!(<KEY>).required(true))
                        .arg(arg!(<VALUE>).required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances and cash flow")
                .subcommand(json_flags(Command::new("balances")))
                .subcommand(json_flags(
                    Command::new("cashflow").arg(arg!(--month <YYYY_MM>).required(true)),
                )),
        )
}
