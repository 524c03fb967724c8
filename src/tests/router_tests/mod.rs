mod buyer_tests;
mod import_tests;
mod page_tests;
