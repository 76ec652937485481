pub mod keypairset;
