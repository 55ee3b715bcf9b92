mod test_chat_fallback;
